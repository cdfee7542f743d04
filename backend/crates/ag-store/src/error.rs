use std::panic::Location;
use std::path::PathBuf;

use error_location::ErrorLocation;
use thiserror::Error;

// SQLite primary result codes
const SQLITE_BUSY: i64 = 5;
const SQLITE_LOCKED: i64 = 6;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store not found at {path} {location}")]
    Missing {
        path: PathBuf,
        location: ErrorLocation,
    },

    #[error("No store location exists on this machine {location}")]
    NoLocations { location: ErrorLocation },

    #[error("Store unavailable at {path}: {source} {location}")]
    Unavailable {
        path: PathBuf,
        /// The file is held by another writer (busy or locked)
        locked: bool,
        #[source]
        source: sqlx::Error,
        location: ErrorLocation,
    },
}

impl StoreError {
    #[track_caller]
    pub fn missing(path: impl Into<PathBuf>) -> Self {
        Self::Missing {
            path: path.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn no_locations() -> Self {
        Self::NoLocations {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Wraps a driver error, classifying lock contention.
    #[track_caller]
    pub fn unavailable(path: impl Into<PathBuf>, source: sqlx::Error) -> Self {
        Self::Unavailable {
            path: path.into(),
            locked: is_lock_error(&source),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. } | Self::NoLocations { .. })
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Unavailable { locked: true, .. })
    }
}

/// True for SQLITE_BUSY / SQLITE_LOCKED (including extended codes) or a "locked" message.
pub fn is_lock_error(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        let primary = db_err
            .code()
            .and_then(|code| code.parse::<i64>().ok())
            .map(|code| code & 0xff);

        if matches!(primary, Some(SQLITE_BUSY) | Some(SQLITE_LOCKED)) {
            return true;
        }
        return db_err.message().to_lowercase().contains("locked");
    }

    err.to_string().to_lowercase().contains("locked")
}

pub type Result<T> = std::result::Result<T, StoreError>;
