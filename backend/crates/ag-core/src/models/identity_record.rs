use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Email placeholder used when the signed-in account cannot be discovered.
pub const UNKNOWN_EMAIL: &str = "Unknown";

/// One saved identity in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub snapshot_path: PathBuf,

    // Audit
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_used_at: Option<DateTime<Utc>>,
}

impl IdentityRecord {
    pub fn new(id: Uuid, display_name: String, email: String, snapshot_path: PathBuf) -> Self {
        Self {
            id,
            display_name,
            email,
            snapshot_path,
            created_at: Utc::now(),
            last_used_at: None,
        }
    }

    pub fn has_unknown_email(&self) -> bool {
        self.email == UNKNOWN_EMAIL
    }

    /// Marks the record as used right now.
    pub fn touch(&mut self) {
        self.last_used_at = Some(Utc::now());
    }
}
