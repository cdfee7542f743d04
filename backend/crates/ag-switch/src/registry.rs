use crate::{Result, SwitchError, write_atomic};

use ag_core::IdentityRecord;

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use uuid::Uuid;

/// All saved identities, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    records: BTreeMap<Uuid, IdentityRecord>,
}

impl Registry {
    pub fn get(&self, id: &Uuid) -> Option<&IdentityRecord> {
        self.records.get(id)
    }

    /// Record owning a known email. Exact, case-sensitive match; "Unknown" never matches.
    pub fn find_by_email(&self, email: &str) -> Option<&IdentityRecord> {
        if email == ag_core::UNKNOWN_EMAIL {
            return None;
        }
        self.records
            .values()
            .find(|r| !r.has_unknown_email() && r.email == email)
    }

    pub fn upsert(&mut self, record: IdentityRecord) {
        self.records.insert(record.id, record);
    }

    pub fn remove(&mut self, id: &Uuid) -> Option<IdentityRecord> {
        self.records.remove(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &IdentityRecord> {
        self.records.values()
    }

    /// Most recently used first; never-used records last, newest first among themselves.
    pub fn sorted_by_last_used(&self) -> Vec<IdentityRecord> {
        let mut records: Vec<IdentityRecord> = self.records.values().cloned().collect();
        records.sort_by(|a, b| match (a.last_used_at, b.last_used_at) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => b.created_at.cmp(&a.created_at),
        });
        records
    }
}

/// The registry's JSON file (`id -> record`).
#[derive(Debug, Clone)]
pub struct RegistryFile {
    path: PathBuf,
}

impl RegistryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the registry. A missing file is an empty registry; an unparsable
    /// one is an error and is left untouched on disk.
    pub fn load(&self) -> Result<Registry> {
        if !self.path.exists() {
            debug!("No registry at {} yet", self.path.display());
            return Ok(Registry::default());
        }

        let contents =
            fs::read_to_string(&self.path).map_err(|e| SwitchError::io(&self.path, e))?;

        if contents.trim().is_empty() {
            return Ok(Registry::default());
        }

        let records: BTreeMap<Uuid, IdentityRecord> = serde_json::from_str(&contents)
            .map_err(|e| SwitchError::registry_corrupt(&self.path, e.to_string()))?;

        if let Some((key, record)) = records.iter().find(|(key, record)| **key != record.id) {
            return Err(SwitchError::registry_corrupt(
                &self.path,
                format!("entry {key} carries id {}", record.id),
            ));
        }

        Ok(Registry { records })
    }

    pub fn save(&self, registry: &Registry) -> Result<()> {
        let json = serde_json::to_string_pretty(&registry.records)?;
        write_atomic(&self.path, json.as_bytes())?;
        info!("Saved registry ({} identities)", registry.len());
        Ok(())
    }
}
