mod naming;
mod registry;

use ag_core::IdentityRecord;

use std::path::Path;

use chrono::{Duration, Utc};
use uuid::Uuid;

pub(crate) fn record(name: &str, email: &str, dir: &Path) -> IdentityRecord {
    let id = Uuid::new_v4();
    IdentityRecord::new(
        id,
        name.to_string(),
        email.to_string(),
        dir.join(format!("{id}.json")),
    )
}

pub(crate) fn used_minutes_ago(mut record: IdentityRecord, minutes: i64) -> IdentityRecord {
    record.last_used_at = Some(Utc::now() - Duration::minutes(minutes));
    record
}
