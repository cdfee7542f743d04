pub mod allow_list;
pub mod identity_record;
pub mod platform;
pub mod process_handle;
pub mod snapshot;
