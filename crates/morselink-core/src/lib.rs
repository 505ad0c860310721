pub mod config;
pub mod errors;
pub mod types;

pub use config::LinkConfig;
pub use errors::{ConfigError, SessionError};
pub use types::*;
