use ag_config::ConfigError;
use ag_core::CoreError;
use ag_process::ProcessError;
use ag_store::StoreError;

use std::panic::Location;
use std::path::PathBuf;

use error_location::ErrorLocation;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum SwitchError {
    #[error("No identity matches '{selector}' {location}")]
    UnknownIdentity {
        selector: String,
        location: ErrorLocation,
    },

    #[error("Snapshot for identity {id} is missing at {path} {location}")]
    SnapshotMissing {
        id: Uuid,
        path: PathBuf,
        location: ErrorLocation,
    },

    #[error("{source} {location}")]
    CorruptSnapshot {
        #[source]
        source: CoreError,
        location: ErrorLocation,
    },

    #[error("{source} {location}")]
    Store {
        #[source]
        source: StoreError,
        location: ErrorLocation,
    },

    #[error("Restore failed at every location: {} {location}", .failures.join("; "))]
    RestoreFailed {
        failures: Vec<String>,
        location: ErrorLocation,
    },

    #[error("{source} {location}")]
    Process {
        #[source]
        source: ProcessError,
        location: ErrorLocation,
    },

    #[error("Registry corrupted at {path}: {message} {location}")]
    RegistryCorrupt {
        path: PathBuf,
        message: String,
        location: ErrorLocation,
    },

    #[error("Failed to serialize registry: {source} {location}")]
    Serialization {
        #[source]
        source: serde_json::Error,
        location: ErrorLocation,
    },

    #[error("IO error at {path}: {source} {location}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Atomic rename failed from {from} to {to}: {source} {location}")]
    AtomicRename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Another operation holds {path} (pid {pid}) {location}")]
    LockHeld {
        path: PathBuf,
        pid: u32,
        location: ErrorLocation,
    },

    #[error("{source} {location}")]
    Config {
        #[source]
        source: ConfigError,
        location: ErrorLocation,
    },
}

impl SwitchError {
    #[track_caller]
    pub fn unknown_identity(selector: impl Into<String>) -> Self {
        Self::UnknownIdentity {
            selector: selector.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn snapshot_missing(id: Uuid, path: impl Into<PathBuf>) -> Self {
        Self::SnapshotMissing {
            id,
            path: path.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn restore_failed(failures: Vec<String>) -> Self {
        Self::RestoreFailed {
            failures,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn registry_corrupt(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::RegistryCorrupt {
            path: path.into(),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn atomic_rename(from: PathBuf, to: PathBuf, source: std::io::Error) -> Self {
        Self::AtomicRename {
            from,
            to,
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn lock_held(path: impl Into<PathBuf>, pid: u32) -> Self {
        Self::LockHeld {
            path: path.into(),
            pid,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Whether retrying the same operation later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::LockHeld { .. } => true,
            Self::Store { source, .. } => source.is_locked(),
            Self::Process { source, .. } => {
                matches!(source, ProcessError::PartialTermination { .. })
            }
            _ => false,
        }
    }

    /// Short advice for the user.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::UnknownIdentity { .. } => {
                "Run `agsw list` to see saved identities and use an index or id from it."
            }
            Self::SnapshotMissing { .. } => {
                "The saved snapshot was removed. \
                   Capture the identity again or run `agsw prune`."
            }
            Self::CorruptSnapshot { .. } => {
                "The snapshot file is damaged. Delete the identity and capture it again."
            }
            Self::Store { source, .. } if source.is_locked() => {
                "The application is holding its database. \
                   Quit it completely (`agsw stop`) and retry."
            }
            Self::Store { source, .. } if source.is_missing() => {
                "The application's database was not found. \
                   Sign in to the application once, or set store.paths in config.toml."
            }
            Self::Store { .. } => "The application's database could not be opened. Check the logs.",
            Self::RestoreFailed { .. } => {
                "No database location accepted the snapshot. \
                   Make sure the application is fully stopped and retry."
            }
            Self::Process { source, .. } => match source {
                ProcessError::ExecutableNotFound { .. } => {
                    "The application executable was not found. \
                       Set target.executable in config.toml."
                }
                ProcessError::PartialTermination { .. } => {
                    "Some application processes would not exit. \
                       Close them manually and retry."
                }
                _ => "The application could not be controlled. Check the logs.",
            },
            Self::RegistryCorrupt { .. } => {
                "The identity registry is damaged. \
                   Fix or remove antigravity_accounts.json in the data directory."
            }
            Self::LockHeld { .. } => {
                "Another agsw command is running. Wait for it to finish and retry."
            }
            Self::Config { .. } => {
                "Configuration file has invalid settings. \
                   Check config.toml or delete it to use defaults."
            }
            Self::Io { .. } | Self::AtomicRename { .. } | Self::Serialization { .. } => {
                "Unable to write to the data directory. \
                   Check file permissions or available disk space."
            }
        }
    }
}

impl From<CoreError> for SwitchError {
    #[track_caller]
    fn from(source: CoreError) -> Self {
        let location = ErrorLocation::from(Location::caller());
        match source {
            CoreError::Serialization { source, .. } => Self::Serialization { source, location },
            source => Self::CorruptSnapshot { source, location },
        }
    }
}

impl From<StoreError> for SwitchError {
    #[track_caller]
    fn from(source: StoreError) -> Self {
        Self::Store {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ProcessError> for SwitchError {
    #[track_caller]
    fn from(source: ProcessError) -> Self {
        Self::Process {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ConfigError> for SwitchError {
    #[track_caller]
    fn from(source: ConfigError) -> Self {
        Self::Config {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<serde_json::Error> for SwitchError {
    #[track_caller]
    fn from(source: serde_json::Error) -> Self {
        Self::Serialization {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SwitchError>;
