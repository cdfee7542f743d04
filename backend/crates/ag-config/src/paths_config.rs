use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_ACCOUNTS_FILE, DEFAULT_BACKUPS_DIR, DEFAULT_LOGS_DIR,
};

use std::path::Path;

use serde::Deserialize;

/// Where the tool keeps its own files.
///
/// `accounts_file`, `backups_dir` and `logs_dir` are relative to the data
/// directory. `data_dir` defaults to the config directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: Option<String>,
    pub accounts_file: String,
    pub backups_dir: String,
    pub logs_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            accounts_file: String::from(DEFAULT_ACCOUNTS_FILE),
            backups_dir: String::from(DEFAULT_BACKUPS_DIR),
            logs_dir: String::from(DEFAULT_LOGS_DIR),
        }
    }
}

impl PathsConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        for (name, value) in [
            ("paths.accounts_file", &self.accounts_file),
            ("paths.backups_dir", &self.backups_dir),
            ("paths.logs_dir", &self.logs_dir),
        ] {
            if value.is_empty() {
                return Err(ConfigError::paths(format!("{name} must not be empty")));
            }
            if Path::new(value).is_absolute() || value.contains("..") {
                return Err(ConfigError::paths(format!(
                    "{name} must be relative and cannot contain '..', got {value}"
                )));
            }
        }

        Ok(())
    }
}
