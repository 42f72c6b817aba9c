pub mod loaders;
pub mod rubric;
pub mod session;
pub mod student;
pub mod template;

pub use loaders::{load_session, parse_session, save_session};
pub use rubric::{Criterion, Level};
pub use session::GradingSession;
pub use student::{GradeResult, GradeStatus, Student};
pub use template::Template;
