use crate::{ITEM_TABLE, Result, StoreError, email_from_entries};

use ag_config::StoreConfig;
use ag_core::{EMAIL_PROBE_KEYS, is_allowed_key};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};
use tracing::{debug, error, info, warn};

/// Outcome of writing one snapshot into every store location.
#[derive(Debug, Default)]
pub struct RestoreReport {
    pub restored: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, StoreError)>,
    pub keys_written: usize,
}

impl RestoreReport {
    /// At least one location took the snapshot.
    pub fn is_success(&self) -> bool {
        !self.restored.is_empty()
    }
}

/// Reads and writes allow-listed keys in the foreign application's SQLite store.
///
/// Every call opens its own short-lived connection so the file is never held
/// between operations.
#[derive(Debug, Clone)]
pub struct StoreAccessor {
    busy_timeout: Duration,
}

impl StoreAccessor {
    pub fn new(busy_timeout: Duration) -> Self {
        Self { busy_timeout }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.busy_timeout())
    }

    /// Returns the requested keys that exist, as text.
    pub async fn read(&self, location: &Path, keys: &[&str]) -> Result<BTreeMap<String, String>> {
        let mut conn = self.open(location, true).await?;
        let sql = format!("SELECT CAST(value AS TEXT) FROM {ITEM_TABLE} WHERE key = ?");

        let mut found = BTreeMap::new();
        for key in keys {
            let value: Option<Option<String>> = sqlx::query_scalar(&sql)
                .bind(*key)
                .fetch_optional(&mut conn)
                .await
                .map_err(|e| StoreError::unavailable(location, e))?;

            match value.flatten() {
                Some(value) => {
                    debug!("Read {key} from {}", location.display());
                    found.insert((*key).to_string(), value);
                }
                None => debug!("Key {key} absent in {}", location.display()),
            }
        }

        close(conn, location).await;
        Ok(found)
    }

    /// Upserts every allow-listed entry in one transaction.
    ///
    /// Returns the number of keys written. Keys outside the allow-list are
    /// dropped before the store is opened.
    pub async fn write(
        &self,
        location: &Path,
        entries: &BTreeMap<String, String>,
    ) -> Result<usize> {
        let allowed: Vec<(&String, &String)> = entries
            .iter()
            .filter(|(key, _)| {
                let keep = is_allowed_key(key);
                if !keep {
                    warn!("Refusing to write non allow-listed key {key}");
                }
                keep
            })
            .collect();

        let mut conn = self.open(location, false).await?;
        let sql = format!("INSERT OR REPLACE INTO {ITEM_TABLE} (key, value) VALUES (?, ?)");

        let mut tx = conn
            .begin()
            .await
            .map_err(|e| StoreError::unavailable(location, e))?;

        for (key, value) in &allowed {
            sqlx::query(&sql)
                .bind(key.as_str())
                .bind(value.as_str())
                .execute(&mut *tx)
                .await
                .map_err(|e| StoreError::unavailable(location, e))?;
            debug!("Restored {key} into {}", location.display());
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::unavailable(location, e))?;

        close(conn, location).await;
        Ok(allowed.len())
    }

    /// Writes the entries into every location, collecting per-location failures.
    pub async fn restore_all(
        &self,
        locations: &[PathBuf],
        entries: &BTreeMap<String, String>,
    ) -> Result<RestoreReport> {
        if locations.is_empty() {
            return Err(StoreError::no_locations());
        }

        let mut report = RestoreReport::default();
        for location in locations {
            match self.write(location, entries).await {
                Ok(written) => {
                    info!("Restored {written} key(s) into {}", location.display());
                    report.keys_written = report.keys_written.max(written);
                    report.restored.push(location.clone());
                }
                Err(e) => {
                    if e.is_locked() {
                        error!(
                            "{} is locked, fully quit the application: {e}",
                            location.display()
                        );
                    } else {
                        error!("Restore into {} failed: {e}", location.display());
                    }
                    report.failures.push((location.clone(), e));
                }
            }
        }

        Ok(report)
    }

    /// Signed-in email from the probe keys, `None` when nothing usable is stored.
    pub async fn extract_email(&self, location: &Path) -> Option<String> {
        match self.read(location, &EMAIL_PROBE_KEYS).await {
            Ok(entries) => email_from_entries(&entries),
            Err(e) => {
                debug!("Email probe failed: {e}");
                None
            }
        }
    }

    async fn open(&self, location: &Path, read_only: bool) -> Result<SqliteConnection> {
        if !location.is_file() {
            return Err(StoreError::missing(location));
        }

        SqliteConnectOptions::new()
            .filename(location)
            .create_if_missing(false)
            .read_only(read_only)
            .busy_timeout(self.busy_timeout)
            .connect()
            .await
            .map_err(|e| StoreError::unavailable(location, e))
    }
}

async fn close(conn: SqliteConnection, location: &Path) {
    if let Err(e) = conn.close().await {
        debug!("Closing {} failed: {e}", location.display());
    }
}
