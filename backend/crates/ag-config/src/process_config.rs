use crate::{ConfigError, ConfigErrorResult};

use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_GRACEFUL_TIMEOUT_MS: u64 = 3000;
pub const DEFAULT_GRACEFUL_SETTLE_MS: u64 = 2000;
pub const DEFAULT_TERM_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
pub const DEFAULT_KILL_SETTLE_MS: u64 = 1000;
pub const DEFAULT_URI_TIMEOUT_MS: u64 = 3000;
pub const DEFAULT_STATUS_POLL_SECS: u64 = 2;

pub const MAX_TERM_TIMEOUT_SECS: u64 = 300;

/// Timings and escalation policy for stopping/starting the foreign app.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProcessConfig {
    /// Upper bound for the polite-quit command (osascript / taskkill)
    pub graceful_timeout_ms: u64,
    /// Pause after an accepted polite-quit request
    pub graceful_settle_ms: u64,
    /// How long to wait for cooperative termination before escalating
    pub term_timeout_secs: u64,
    /// Liveness poll interval while waiting
    pub poll_interval_ms: u64,
    /// Pause after forceful termination before the final check
    pub kill_settle_ms: u64,
    /// Escalate to a forceful kill when cooperative termination times out
    pub force_kill: bool,
    /// Try the URI scheme before launching the executable directly
    pub use_uri: bool,
    /// Upper bound for the URI opener to report failure
    pub uri_timeout_ms: u64,
    /// Background status poll interval
    pub status_poll_secs: u64,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            graceful_timeout_ms: DEFAULT_GRACEFUL_TIMEOUT_MS,
            graceful_settle_ms: DEFAULT_GRACEFUL_SETTLE_MS,
            term_timeout_secs: DEFAULT_TERM_TIMEOUT_SECS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            kill_settle_ms: DEFAULT_KILL_SETTLE_MS,
            force_kill: true,
            use_uri: true,
            uri_timeout_ms: DEFAULT_URI_TIMEOUT_MS,
            status_poll_secs: DEFAULT_STATUS_POLL_SECS,
        }
    }
}

impl ProcessConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::process("process.poll_interval_ms must be > 0"));
        }

        if self.term_timeout_secs == 0 || self.term_timeout_secs > MAX_TERM_TIMEOUT_SECS {
            return Err(ConfigError::process(format!(
                "process.term_timeout_secs must be 1-{}, got {}",
                MAX_TERM_TIMEOUT_SECS, self.term_timeout_secs
            )));
        }

        if self.poll_interval_ms > self.term_timeout_secs * 1000 {
            return Err(ConfigError::process(format!(
                "process.poll_interval_ms ({}) must not exceed process.term_timeout_secs ({}s)",
                self.poll_interval_ms, self.term_timeout_secs
            )));
        }

        if self.status_poll_secs == 0 {
            return Err(ConfigError::process("process.status_poll_secs must be > 0"));
        }

        Ok(())
    }

    pub fn graceful_timeout(&self) -> Duration {
        Duration::from_millis(self.graceful_timeout_ms)
    }

    pub fn graceful_settle(&self) -> Duration {
        Duration::from_millis(self.graceful_settle_ms)
    }

    pub fn term_timeout(&self) -> Duration {
        Duration::from_secs(self.term_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn kill_settle(&self) -> Duration {
        Duration::from_millis(self.kill_settle_ms)
    }

    pub fn uri_timeout(&self) -> Duration {
        Duration::from_millis(self.uri_timeout_ms)
    }

    pub fn status_poll(&self) -> Duration {
        Duration::from_secs(self.status_poll_secs)
    }
}
