//! Application configuration

pub mod settings;

pub use settings::{AppConfig, FileConfig, LogFormat, LoggingConfig, ServerConfig};
