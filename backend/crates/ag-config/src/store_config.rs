use crate::{ConfigError, ConfigErrorResult, DEFAULT_BUSY_TIMEOUT_MS};

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Foreign store access settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Explicit store files; empty means platform discovery
    pub paths: Vec<String>,
    /// SQLite busy timeout while the app may hold the file
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl StoreConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if let Some(relative) = self.paths.iter().find(|p| !Path::new(p).is_absolute()) {
            return Err(ConfigError::store(format!(
                "store.paths entries must be absolute, got {relative}"
            )));
        }

        Ok(())
    }

    pub fn explicit_paths(&self) -> Vec<PathBuf> {
        self.paths.iter().map(PathBuf::from).collect()
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}
