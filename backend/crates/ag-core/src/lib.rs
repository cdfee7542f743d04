pub mod codec;
pub mod error;
pub mod models;


pub use codec::{SNAPSHOT_FORMAT_VERSION, decode_snapshot, encode_snapshot};
pub use error::{CoreError, Result as CoreResult};
pub use models::allow_list::{ALLOWED_KEYS, EMAIL_PROBE_KEYS, is_allowed_key};
pub use models::identity_record::{IdentityRecord, UNKNOWN_EMAIL};
pub use models::platform::Platform;
pub use models::process_handle::ProcessHandle;
pub use models::snapshot::Snapshot;
