pub mod toml_loader;

pub use toml_loader::{load_session, parse_session, save_session};
