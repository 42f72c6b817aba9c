pub mod csv_io;
pub mod llm_service;
pub mod prompts;
pub mod statistics;
pub mod template_store;
pub mod thresholds;
pub mod warn_writer;

pub use llm_service::{GradingModel, LlmService};
pub use statistics::{summarize, ClassSummary};
pub use template_store::TemplateStore;
pub use thresholds::Band;
pub use warn_writer::WarnWriter;
