//! Adapters layer: concrete stores, profile directory and notifiers.

pub mod file_store;
pub mod lock;
pub mod memory_store;
pub mod notifier;
pub mod profiles;

pub use file_store::FileConnectionStore;
pub use lock::{DataDirLock, LockError};
pub use memory_store::{InMemoryConnectionStore, VersionedTable};
pub use notifier::{BusNotifier, NoopNotifier};
pub use profiles::InMemoryProfileDirectory;
