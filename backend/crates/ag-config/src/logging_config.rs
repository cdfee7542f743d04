use crate::{DEFAULT_LOG_FILE_PREFIX, DEFAULT_LOG_LEVEL, LogLevel};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    /// Prefix of the daily-rotated log files in `paths.logs_dir`
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel(DEFAULT_LOG_LEVEL),
            file_prefix: String::from(DEFAULT_LOG_FILE_PREFIX),
        }
    }
}
