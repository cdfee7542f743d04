pub mod atomic;
pub mod error;
pub mod lock;
pub mod registry;
pub mod switcher;

#[cfg(test)]
mod tests;

pub use atomic::write_atomic;
pub use error::{Result, SwitchError};
pub use lock::OperationLock;
pub use registry::{Registry, RegistryFile};
pub use switcher::{IdentitySwitcher, PruneReport, SwitchOutcome, SwitcherPaths, default_name};
