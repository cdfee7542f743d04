use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// A running process believed to belong to the foreign application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ProcessHandle {
    pub pid: u32,
    pub name: String,
    pub exe_path: Option<PathBuf>,
}

impl ProcessHandle {
    pub fn new(pid: u32, name: impl Into<String>, exe_path: Option<PathBuf>) -> Self {
        Self {
            pid,
            name: name.into(),
            exe_path,
        }
    }

    /// Lower-cased executable path, or empty when the OS hides it.
    pub fn exe_lowercase(&self) -> String {
        self.exe_path
            .as_ref()
            .map(|p| p.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }
}

impl fmt::Display for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.pid)
    }
}
