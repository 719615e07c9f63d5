use config::ConfigError;
use tracing::Level;

use crate::errors::{AppError, AppResult};

pub(crate) fn parse_log_level(level: &str) -> AppResult<Level> {
    match level.to_ascii_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(AppError::ConfigError(ConfigError::Message(format!(
            "unknown log level: {}",
            other
        )))),
    }
}
