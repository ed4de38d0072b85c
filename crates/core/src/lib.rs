pub mod config;
pub mod error;

pub use config::{BrowserKind, SessionConfig};
pub use error::{Error, Result};
