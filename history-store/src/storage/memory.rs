//! In-memory [`Storage`] implementation for tests and ephemeral sessions.
//!
//! Uses a `HashMap` behind `std::sync::RwLock`. An optional byte quota makes
//! oversized writes fail the way a full browser store does.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::errors::StorageError;

use super::Storage;

/// In-memory key/value store.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects any single value longer than `limit` bytes.
    pub fn with_quota(limit: usize) -> Self {
        Self {
            entries: RwLock::default(),
            quota_bytes: Some(limit),
        }
    }

    /// Seeds a raw value, bypassing the quota (e.g. to simulate corrupt data).
    pub fn with_raw(self, key: &str, value: &str) -> Self {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        self
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(limit) = self.quota_bytes {
            if value.len() > limit {
                return Err(StorageError::QuotaExceeded {
                    needed: value.len(),
                    limit,
                });
            }
        }
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}
