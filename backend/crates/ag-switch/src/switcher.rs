use crate::{OperationLock, RegistryFile, Result, SwitchError, write_atomic};

use ag_config::Config;
use ag_core::{
    ALLOWED_KEYS, IdentityRecord, Snapshot, UNKNOWN_EMAIL, decode_snapshot, encode_snapshot,
};
use ag_process::{ProcessController, ProcessError, StartOutcome, StopReport};
use ag_store::{StoreAccessor, StoreError, StoreLocations};

use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const SNAPSHOT_EXTENSION: &str = "json";

/// Files owned by the switcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitcherPaths {
    /// Holds the operation lock file
    pub data_dir: PathBuf,
    pub registry: PathBuf,
    pub backups_dir: PathBuf,
}

impl SwitcherPaths {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            data_dir: config.data_dir()?,
            registry: config.accounts_path()?,
            backups_dir: config.backups_dir()?,
        })
    }

    fn snapshot_path(&self, id: &Uuid) -> PathBuf {
        self.backups_dir.join(format!("{id}.{SNAPSHOT_EXTENSION}"))
    }
}

/// What a successful switch did.
#[derive(Debug)]
pub struct SwitchOutcome {
    pub record: IdentityRecord,
    /// Store files that took the snapshot
    pub restored: Vec<PathBuf>,
    /// Store files that did not, with the reason
    pub failed_locations: Vec<(PathBuf, String)>,
    pub stop_report: Option<StopReport>,
    /// Stop failed; the switch went ahead anyway
    pub stop_error: Option<ProcessError>,
    pub start: Option<StartOutcome>,
    /// Start failed after a successful restore
    pub start_error: Option<ProcessError>,
}

/// Cleanup performed by [`IdentitySwitcher::prune`].
#[derive(Debug, Default)]
pub struct PruneReport {
    pub removed_records: Vec<IdentityRecord>,
    pub removed_files: Vec<PathBuf>,
}

/// Display name used when the caller gives none.
pub fn default_name(email: &str, now: DateTime<Utc>) -> String {
    match email.split_once('@') {
        Some((local, _)) if email != UNKNOWN_EMAIL && !local.is_empty() => local.to_string(),
        _ => format!("Account_{}", now.timestamp()),
    }
}

/// Captures, switches and manages saved identities.
///
/// The only component that talks to the store, the process controller and the
/// registry together. Mutating operations are serialized in-process by a mutex
/// and across processes by [`OperationLock`].
pub struct IdentitySwitcher {
    paths: SwitcherPaths,
    registry: RegistryFile,
    locations: StoreLocations,
    accessor: StoreAccessor,
    controller: Arc<ProcessController>,
    op_lock: Mutex<()>,
}

impl IdentitySwitcher {
    pub fn new(
        paths: SwitcherPaths,
        locations: StoreLocations,
        accessor: StoreAccessor,
        controller: Arc<ProcessController>,
    ) -> Self {
        Self {
            registry: RegistryFile::new(&paths.registry),
            paths,
            locations,
            accessor,
            controller,
            op_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &Config, controller: Arc<ProcessController>) -> Result<Self> {
        Ok(Self::new(
            SwitcherPaths::from_config(config)?,
            StoreLocations::from_config(&config.store, &config.target.app_name),
            StoreAccessor::from_config(&config.store),
            controller,
        ))
    }

    pub fn controller(&self) -> &Arc<ProcessController> {
        &self.controller
    }

    pub fn locations(&self) -> &StoreLocations {
        &self.locations
    }

    /// Saves the identity currently signed in to the application.
    pub async fn capture(
        &self,
        name: Option<String>,
        email: Option<String>,
    ) -> Result<IdentityRecord> {
        let _guard = self.op_lock.lock().await;
        let _file_lock = OperationLock::acquire(&self.paths.data_dir)?;

        let primary = self.locations.primary().ok_or_else(StoreError::no_locations)?;

        let email = match non_blank(email) {
            Some(email) => email,
            None => match self.accessor.extract_email(&primary).await {
                Some(email) => email,
                None => {
                    warn!("Signed-in email not found, capturing as {UNKNOWN_EMAIL}");
                    String::from(UNKNOWN_EMAIL)
                }
            },
        };

        let entries = self.accessor.read(&primary, &ALLOWED_KEYS).await?;
        if entries.is_empty() {
            warn!("No identity keys present in {}", primary.display());
        }

        let mut registry = self.registry.load()?;
        let derived = default_name(&email, Utc::now());
        let name = non_blank(name);

        let mut record = match registry.find_by_email(&email).cloned() {
            Some(mut existing) => {
                info!("Updating identity {} ({email})", existing.id);
                if let Some(name) = name.filter(|n| *n != derived) {
                    existing.display_name = name;
                }
                existing.email = email.clone();
                existing
            }
            None => {
                let id = Uuid::new_v4();
                info!("Creating identity {id} ({email})");
                IdentityRecord::new(
                    id,
                    name.unwrap_or(derived),
                    email.clone(),
                    self.paths.snapshot_path(&id),
                )
            }
        };

        let snapshot = Snapshot::new(email, entries);
        write_atomic(&record.snapshot_path, &encode_snapshot(&snapshot)?)?;
        debug!(
            "Wrote snapshot with {} key(s) to {}",
            snapshot.entries.len(),
            record.snapshot_path.display()
        );

        record.touch();
        registry.upsert(record.clone());
        self.registry.save(&registry)?;

        Ok(record)
    }

    /// Replaces the application's identity with a saved one.
    pub async fn switch(&self, id: Uuid) -> Result<SwitchOutcome> {
        let _guard = self.op_lock.lock().await;
        let _file_lock = OperationLock::acquire(&self.paths.data_dir)?;

        let mut registry = self.registry.load()?;
        let mut record = registry
            .get(&id)
            .cloned()
            .ok_or_else(|| SwitchError::unknown_identity(id.to_string()))?;

        if !record.snapshot_path.is_file() {
            return Err(SwitchError::snapshot_missing(id, &record.snapshot_path));
        }
        let bytes = std::fs::read(&record.snapshot_path)
            .map_err(|e| SwitchError::io(&record.snapshot_path, e))?;
        let snapshot = decode_snapshot(&bytes)?;
        info!(
            "Switching to {} ({}), snapshot from {}",
            record.display_name, record.email, snapshot.backup_time
        );

        let (stop_report, stop_error) = match self.controller.stop().await {
            Ok(report) => (Some(report), None),
            Err(e) => {
                warn!("Stop incomplete, continuing with restore: {e}");
                (None, Some(e))
            }
        };

        let targets = self.locations.restore_targets();
        let report = self.accessor.restore_all(&targets, &snapshot.entries).await?;
        let failed_locations: Vec<(PathBuf, String)> = report
            .failures
            .iter()
            .map(|(path, e)| (path.clone(), e.to_string()))
            .collect();

        if !report.is_success() {
            error!("Restore failed at all {} location(s)", targets.len());
            return Err(SwitchError::restore_failed(
                failed_locations
                    .iter()
                    .map(|(path, e)| format!("{}: {e}", path.display()))
                    .collect(),
            ));
        }

        record.touch();
        registry.upsert(record.clone());
        self.registry.save(&registry)?;

        let (start, start_error) = match self.controller.start().await {
            Ok(outcome) => (Some(outcome), None),
            Err(e) => {
                warn!("Identity restored but the application did not start: {e}");
                (None, Some(e))
            }
        };

        info!("Switched to {}", record.display_name);
        Ok(SwitchOutcome {
            record,
            restored: report.restored,
            failed_locations,
            stop_report,
            stop_error,
            start,
            start_error,
        })
    }

    /// Removes an identity and its snapshot.
    pub async fn delete(&self, id: Uuid) -> Result<IdentityRecord> {
        let _guard = self.op_lock.lock().await;
        let _file_lock = OperationLock::acquire(&self.paths.data_dir)?;

        let mut registry = self.registry.load()?;
        let record = registry
            .remove(&id)
            .ok_or_else(|| SwitchError::unknown_identity(id.to_string()))?;

        remove_snapshot(&record.snapshot_path);
        self.registry.save(&registry)?;

        info!("Deleted identity {} ({})", record.display_name, record.email);
        Ok(record)
    }

    /// Identities, most recently used first.
    pub fn list(&self) -> Result<Vec<IdentityRecord>> {
        Ok(self.registry.load()?.sorted_by_last_used())
    }

    /// Resolves a 1-based index from [`list`](Self::list) or a full id.
    pub fn resolve(&self, selector: &str) -> Result<Uuid> {
        let selector = selector.trim();
        let records = self.list()?;

        if let Ok(index) = selector.parse::<usize>() {
            return index
                .checked_sub(1)
                .and_then(|i| records.get(i))
                .map(|r| r.id)
                .ok_or_else(|| SwitchError::unknown_identity(selector));
        }

        match Uuid::parse_str(selector) {
            Ok(id) if records.iter().any(|r| r.id == id) => Ok(id),
            _ => Err(SwitchError::unknown_identity(selector)),
        }
    }

    /// The saved identity matching the application's signed-in email, if any.
    pub async fn current(&self) -> Result<Option<IdentityRecord>> {
        let Some(primary) = self.locations.primary() else {
            return Ok(None);
        };
        let Some(email) = self.accessor.extract_email(&primary).await else {
            return Ok(None);
        };

        Ok(self.registry.load()?.find_by_email(&email).cloned())
    }

    /// Drops records whose snapshot is gone and snapshot files no record owns.
    pub async fn prune(&self) -> Result<PruneReport> {
        let _guard = self.op_lock.lock().await;
        let _file_lock = OperationLock::acquire(&self.paths.data_dir)?;

        let mut registry = self.registry.load()?;
        let mut report = PruneReport::default();

        let orphaned: Vec<Uuid> = registry
            .records()
            .filter(|r| !r.snapshot_path.is_file())
            .map(|r| r.id)
            .collect();
        for id in orphaned {
            if let Some(record) = registry.remove(&id) {
                info!("Pruning {} (snapshot missing)", record.display_name);
                report.removed_records.push(record);
            }
        }

        if self.paths.backups_dir.is_dir() {
            // By file name, so a differently spelled data dir still matches
            let owned: HashSet<OsString> = registry
                .records()
                .filter_map(|r| r.snapshot_path.file_name().map(OsStr::to_os_string))
                .collect();
            let entries = std::fs::read_dir(&self.paths.backups_dir)
                .map_err(|e| SwitchError::io(&self.paths.backups_dir, e))?;

            for entry in entries.flatten() {
                let path = entry.path();
                let is_snapshot = path.is_file()
                    && path.extension().and_then(|e| e.to_str()) == Some(SNAPSHOT_EXTENSION);

                if is_snapshot && !owned.contains(&entry.file_name()) {
                    match std::fs::remove_file(&path) {
                        Ok(()) => {
                            info!("Pruned unreferenced snapshot {}", path.display());
                            report.removed_files.push(path);
                        }
                        Err(e) => warn!("Could not remove {}: {e}", path.display()),
                    }
                }
            }
        }

        if !report.removed_records.is_empty() {
            self.registry.save(&registry)?;
        }

        Ok(report)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn remove_snapshot(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!("Removed snapshot {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove snapshot {}: {e}", path.display()),
    }
}
