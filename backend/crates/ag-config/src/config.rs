use crate::{
    CONFIG_DIR_ENV, CONFIG_FILENAME, ConfigError, ConfigErrorResult, DEFAULT_DATA_DIR_NAME,
    LoggingConfig, PathsConfig, ProcessConfig, StoreConfig, TargetConfig,
};

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub process: ProcessConfig,
    pub target: TargetConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load config.
    ///
    /// Loading order:
    /// 1. Check for AG_CONFIG_DIR env var, else use ~/.antigravity-agent/
    /// 2. Auto-create config directory if it doesn't exist
    /// 3. Load config.toml if it exists, else use defaults
    /// 4. Apply AG_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;

        if !config_dir.exists() {
            std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::Io {
                path: config_dir.clone(),
                source: e,
            })?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the config directory.
    /// Priority: AG_CONFIG_DIR env var > ~/.antigravity-agent/
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(DEFAULT_DATA_DIR_NAME))
    }

    /// Validate all configuration.
    /// Call after load() to catch all errors at startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.paths.validate()?;
        self.process.validate()?;
        self.target.validate()?;
        self.store.validate()?;

        if let Some(data_dir) = &self.paths.data_dir
            && !Path::new(data_dir).is_absolute()
        {
            return Err(ConfigError::paths(format!(
                "paths.data_dir must be absolute, got {data_dir}"
            )));
        }

        Ok(())
    }

    /// Directory holding the registry, snapshots and logs.
    pub fn data_dir(&self) -> ConfigErrorResult<PathBuf> {
        match &self.paths.data_dir {
            Some(dir) => Ok(PathBuf::from(dir)),
            None => Self::config_dir(),
        }
    }

    pub fn accounts_path(&self) -> ConfigErrorResult<PathBuf> {
        Ok(self.data_dir()?.join(&self.paths.accounts_file))
    }

    pub fn backups_dir(&self) -> ConfigErrorResult<PathBuf> {
        Ok(self.data_dir()?.join(&self.paths.backups_dir))
    }

    pub fn logs_dir(&self) -> ConfigErrorResult<PathBuf> {
        Ok(self.data_dir()?.join(&self.paths.logs_dir))
    }

    /// Log configuration summary.
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        match self.data_dir() {
            Ok(dir) => info!("  data_dir: {}", dir.display()),
            Err(e) => info!("  data_dir: unresolved ({e})"),
        }
        info!(
            "  target: {} (uri {}, executable {})",
            self.target.app_name,
            self.target.uri,
            self.target.executable.as_deref().unwrap_or("auto")
        );
        info!(
            "  process: term={}s, poll={}ms, force_kill={}, use_uri={}",
            self.process.term_timeout_secs,
            self.process.poll_interval_ms,
            self.process.force_kill,
            self.process.use_uri
        );
        if self.store.paths.is_empty() {
            info!("  store: discovered (busy {}ms)", self.store.busy_timeout_ms);
        } else {
            info!(
                "  store: {} explicit path(s) (busy {}ms)",
                self.store.paths.len(),
                self.store.busy_timeout_ms
            );
        }
        info!(
            "  logging: {} (prefix {})",
            *self.logging.level, self.logging.file_prefix
        );
    }

    fn apply_env_overrides(&mut self) {
        // Paths
        Self::apply_env_option_string("AG_DATA_DIR", &mut self.paths.data_dir);

        // Process
        Self::apply_env_parse("AG_TERM_TIMEOUT_SECS", &mut self.process.term_timeout_secs);
        Self::apply_env_parse("AG_POLL_INTERVAL_MS", &mut self.process.poll_interval_ms);
        Self::apply_env_parse("AG_KILL_SETTLE_MS", &mut self.process.kill_settle_ms);
        Self::apply_env_bool("AG_FORCE_KILL", &mut self.process.force_kill);
        Self::apply_env_bool("AG_USE_URI", &mut self.process.use_uri);

        // Target
        Self::apply_env_string("AG_APP_NAME", &mut self.target.app_name);
        Self::apply_env_string("AG_URI", &mut self.target.uri);
        Self::apply_env_option_string("AG_EXECUTABLE", &mut self.target.executable);

        // Store
        if let Some(paths) = std::env::var_os("AG_STORE_PATHS") {
            self.store.paths = std::env::split_paths(&paths)
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.to_string_lossy().into_owned())
                .collect();
        }
        Self::apply_env_parse("AG_BUSY_TIMEOUT_MS", &mut self.store.busy_timeout_ms);

        // Logging
        Self::apply_env_parse("AG_LOG_LEVEL", &mut self.logging.level);
    }

    /// Helper: Apply environment variable override for String values
    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Helper: Apply environment variable override for bool values (accepts "true"/"1")
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    /// Helper: Apply environment variable override for parseable values
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    /// Helper: Apply environment variable override for Option<String> values
    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = Some(val);
        }
    }
}
