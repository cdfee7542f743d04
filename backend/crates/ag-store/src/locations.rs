use ag_config::StoreConfig;
use ag_core::Platform;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::debug;

const STORE_FILE: &str = "state.vscdb";
const BACKUP_SUFFIX: &str = ".backup";

/// Well-known store files for a platform, most specific first.
///
/// `app_data` is the roaming application-data directory and only matters on Windows.
pub fn candidate_paths(
    platform: Platform,
    app_name: &str,
    home: &Path,
    app_data: Option<&Path>,
) -> Vec<PathBuf> {
    match platform {
        Platform::MacOs => {
            let base = home.join("Library").join("Application Support").join(app_name);
            vec![
                base.join("User").join("globalStorage").join(STORE_FILE),
                base.join(STORE_FILE),
            ]
        }
        Platform::Windows => {
            let Some(app_data) = app_data else {
                return Vec::new();
            };
            let base = app_data.join(app_name);
            vec![
                base.join("User").join("globalStorage").join(STORE_FILE),
                base.join("User").join(STORE_FILE),
                base.join(STORE_FILE),
            ]
        }
        Platform::Linux => {
            let base = home.join(".config").join(app_name);
            vec![
                base.join("User").join("globalStorage").join(STORE_FILE),
                base.join(STORE_FILE),
            ]
        }
    }
}

/// `state.vscdb` -> `state.vscdb.backup`
pub fn backup_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from(STORE_FILE));
    name.push(BACKUP_SUFFIX);
    path.with_file_name(name)
}

/// The ordered set of store files this machine may have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLocations {
    candidates: Vec<PathBuf>,
}

impl StoreLocations {
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self { candidates }
    }

    /// Explicit `store.paths` when configured, otherwise platform discovery.
    pub fn from_config(config: &StoreConfig, app_name: &str) -> Self {
        if !config.paths.is_empty() {
            return Self::new(config.explicit_paths());
        }

        let Some(home) = dirs::home_dir() else {
            debug!("No home directory, store discovery yields nothing");
            return Self::new(Vec::new());
        };
        let app_data = std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .or_else(dirs::config_dir);

        Self::new(candidate_paths(
            Platform::current(),
            app_name,
            &home,
            app_data.as_deref(),
        ))
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// First candidate that exists; identity reads and captures use it.
    pub fn primary(&self) -> Option<PathBuf> {
        self.candidates.iter().find(|p| p.is_file()).cloned()
    }

    /// Every existing candidate plus every existing `.backup` sibling, without duplicates.
    pub fn restore_targets(&self) -> Vec<PathBuf> {
        let mut targets: Vec<PathBuf> = Vec::new();

        for candidate in &self.candidates {
            for path in [candidate.clone(), backup_sibling(candidate)] {
                if path.is_file() && !targets.contains(&path) {
                    targets.push(path);
                }
            }
        }

        targets
    }
}
