mod config;
mod environment;
mod error;

pub use config::{AppConfig, CloudinaryConfig, ConfigError, MediaHostConfig, S3MediaConfig};
pub use environment::Environment;
pub use error::AppError;
