use ag_core::ProcessHandle;

use std::panic::Location;
use std::path::PathBuf;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("No executable found for {app} (searched: {}) {location}", list_paths(.searched))]
    ExecutableNotFound {
        app: String,
        searched: Vec<PathBuf>,
        location: ErrorLocation,
    },

    #[error("Processes survived termination: {} {location}", list_handles(.survivors))]
    PartialTermination {
        survivors: Vec<ProcessHandle>,
        location: ErrorLocation,
    },

    #[error("Failed to launch {target}: {source} {location}")]
    Launch {
        target: String,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Failed to signal pid {pid}: {message} {location}")]
    Signal {
        pid: u32,
        message: String,
        location: ErrorLocation,
    },
}

impl ProcessError {
    #[track_caller]
    pub fn executable_not_found(app: impl Into<String>, searched: Vec<PathBuf>) -> Self {
        Self::ExecutableNotFound {
            app: app.into(),
            searched,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn partial_termination(survivors: Vec<ProcessHandle>) -> Self {
        Self::PartialTermination {
            survivors,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn launch(target: impl Into<String>, source: std::io::Error) -> Self {
        Self::Launch {
            target: target.into(),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn signal(pid: u32, message: impl Into<String>) -> Self {
        Self::Signal {
            pid,
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

fn list_handles(handles: &[ProcessHandle]) -> String {
    handles
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn list_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return String::from("PATH");
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, ProcessError>;
