pub mod accessor;
pub mod error;
pub mod identity;
pub mod locations;


pub use accessor::{RestoreReport, StoreAccessor};
pub use error::{Result, StoreError};
pub use identity::email_from_entries;
pub use locations::{StoreLocations, backup_sibling, candidate_paths};

/// Name of the key/value table inside the foreign store.
pub const ITEM_TABLE: &str = "ItemTable";
