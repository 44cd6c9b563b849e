pub mod config;
pub mod error;
pub mod logger;
pub mod models;

pub use config::{Credentials, TradingConfig};
pub use error::{ConfigError, ValidationError};
