//! Unified error types for the crate.

use thiserror::Error;

/// Persistence failures of the history ledger.
///
/// These never escape [`HistoryStore`](crate::HistoryStore) mutations; they are
/// logged and kept for inspection via
/// [`HistoryStore::last_persist_error`](crate::HistoryStore::last_persist_error).
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O or filesystem errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The ledger could not be serialized.
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The backend refused a value larger than its quota.
    #[error("storage quota exceeded: {needed} bytes needed, limit is {limit}")]
    QuotaExceeded { needed: usize, limit: usize },

    /// Stored data exists but is not a valid ledger.
    #[error("corrupt record under `{key}`: {reason}")]
    Corrupt { key: String, reason: String },
}
