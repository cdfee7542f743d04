use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Captured allow-listed store values for one identity.
///
/// Values are opaque strings already serialized by the foreign application.
/// Keys that were absent at capture time are simply not present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub account_email: String,
    pub backup_time: DateTime<Utc>,
    pub entries: BTreeMap<String, String>,
}

impl Snapshot {
    pub fn new(account_email: impl Into<String>, entries: BTreeMap<String, String>) -> Self {
        Self {
            account_email: account_email.into(),
            backup_time: Utc::now(),
            entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
