//! Key/value persistence abstraction for the history ledger.
//!
//! The [`Storage`] trait mirrors a browser-style local store: string values
//! under string keys, synchronous, best-effort. Backends:
//!
//! | Backend | Use |
//! |---------|-----|
//! | [`memory::MemoryStorage`] | tests, ephemeral sessions, quota simulation |
//! | [`file::FileStorage`] | one JSON file per key under a directory |
//!
//! There is no cross-process locking: two writers race and the last write wins.

pub mod file;
pub mod memory;

use crate::errors::StorageError;

/// Abstract string key/value backend.
///
/// Implementations must be `Send + Sync` so a store can be shared across tasks.
pub trait Storage: Send + Sync {
    /// Returns the value under `key`, or `None` if nothing is stored.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Deletes `key`. Deleting an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
