//! Snapshot file codec.
//!
//! Snapshots are stored as pretty-printed JSON so a user can inspect them:
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "account_email": "alice@example.com",
//!   "backup_time": "2025-01-01T00:00:00Z",
//!   "entries": { "antigravityAuthStatus": "{...}" }
//! }
//! ```

use crate::{CoreError, CoreResult, Snapshot};

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotFileRef<'a> {
    format_version: u32,
    account_email: &'a str,
    backup_time: &'a DateTime<Utc>,
    entries: &'a BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct SnapshotFile {
    format_version: u32,
    account_email: String,
    backup_time: DateTime<Utc>,
    entries: BTreeMap<String, String>,
}

/// Serializes a snapshot deterministically (entries in key order).
pub fn encode_snapshot(snapshot: &Snapshot) -> CoreResult<Vec<u8>> {
    let file = SnapshotFileRef {
        format_version: SNAPSHOT_FORMAT_VERSION,
        account_email: &snapshot.account_email,
        backup_time: &snapshot.backup_time,
        entries: &snapshot.entries,
    };

    Ok(serde_json::to_vec_pretty(&file)?)
}

/// Parses a snapshot, rejecting anything malformed as a whole.
pub fn decode_snapshot(bytes: &[u8]) -> CoreResult<Snapshot> {
    let file: SnapshotFile =
        serde_json::from_slice(bytes).map_err(|e| CoreError::corrupt_snapshot(e.to_string()))?;

    if file.format_version != SNAPSHOT_FORMAT_VERSION {
        return Err(CoreError::corrupt_snapshot(format!(
            "unsupported format_version {} (expected {SNAPSHOT_FORMAT_VERSION})",
            file.format_version
        )));
    }

    Ok(Snapshot {
        account_email: file.account_email,
        backup_time: file.backup_time,
        entries: file.entries,
    })
}
