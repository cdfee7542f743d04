mod config;
mod error;
mod log_level;
mod logging_config;
mod paths_config;
mod process_config;
mod store_config;
mod target_config;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use error::{ConfigError, ConfigErrorResult};
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use paths_config::PathsConfig;
pub use process_config::ProcessConfig;
pub use store_config::StoreConfig;
pub use target_config::TargetConfig;

const CONFIG_FILENAME: &str = "config.toml";
const CONFIG_DIR_ENV: &str = "AG_CONFIG_DIR";
const DEFAULT_DATA_DIR_NAME: &str = ".antigravity-agent";
const DEFAULT_ACCOUNTS_FILE: &str = "antigravity_accounts.json";
const DEFAULT_BACKUPS_DIR: &str = "backups";
const DEFAULT_LOGS_DIR: &str = "logs";
const DEFAULT_LOG_LEVEL_STRING: &str = "info";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_FILE_PREFIX: &str = "agsw";
const DEFAULT_APP_NAME: &str = "Antigravity";
const DEFAULT_URI: &str = "antigravity://oauth-success";
const DEFAULT_MANAGER_MARKER: &str = "manager";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 2000;
