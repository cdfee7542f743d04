use crate::{ConfigError, ConfigErrorResult, DEFAULT_APP_NAME, DEFAULT_MANAGER_MARKER, DEFAULT_URI};

use serde::Deserialize;

/// Identifies the foreign application on this machine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Application/bundle name (`Antigravity`)
    pub app_name: String,
    /// URI used to activate the app through the OS URI handler
    pub uri: String,
    /// Explicit executable path, tried before the well-known locations
    pub executable: Option<String>,
    /// Extra arguments for a direct launch
    pub launch_args: Vec<String>,
    /// Substring that marks this manager's own processes on Windows
    pub manager_marker: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            app_name: String::from(DEFAULT_APP_NAME),
            uri: String::from(DEFAULT_URI),
            executable: None,
            launch_args: Vec::new(),
            manager_marker: String::from(DEFAULT_MANAGER_MARKER),
        }
    }
}

impl TargetConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.app_name.trim().is_empty() {
            return Err(ConfigError::target("target.app_name must not be empty"));
        }

        match self.uri.split_once("://") {
            Some((scheme, _)) if !scheme.is_empty() => {}
            _ => {
                return Err(ConfigError::target(format!(
                    "target.uri must look like <scheme>://..., got {}",
                    self.uri
                )));
            }
        }

        if self.manager_marker.trim().is_empty() {
            return Err(ConfigError::target("target.manager_marker must not be empty"));
        }

        Ok(())
    }

    /// Lower-cased process name on macOS/Linux (`antigravity`).
    pub fn process_name(&self) -> String {
        self.app_name.to_lowercase()
    }

    /// Windows image name (`Antigravity.exe`).
    pub fn image_name(&self) -> String {
        format!("{}.exe", self.app_name)
    }
}
