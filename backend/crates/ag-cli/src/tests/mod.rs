
use ag_core::IdentityRecord;

use std::path::PathBuf;

use uuid::Uuid;

pub(crate) fn record(name: &str, email: &str) -> IdentityRecord {
    let id = Uuid::new_v4();
    IdentityRecord::new(
        id,
        name.to_string(),
        email.to_string(),
        PathBuf::from(format!("/data/backups/{id}.json")),
    )
}
