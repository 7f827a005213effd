//! Save/load persistence
//!
//! Features:
//! - Pluggable key-value backends (memory, JSON file, browser LocalStorage)
//! - Flat per-slot snapshot records
//! - Corruption detection: unusable saves are reported and treated as absent

pub mod save;
pub mod store;

pub use save::{DEFAULT_SLOT, SaveSlot};
#[cfg(target_arch = "wasm32")]
pub use store::LocalStore;
pub use store::{FileStore, KeyValueStore, MemoryStore};
