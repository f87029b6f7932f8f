//! Local, bounded ledger of past question/answer exchanges.
//!
//! ```no_run
//! use std::sync::Arc;
//! use history_store::{HistoryStore, storage::file::FileStorage};
//!
//! let store = HistoryStore::open(Arc::new(FileStorage::new("./.rag-console")));
//! for item in store.list() {
//!     println!("{} {}", item.id, item.question);
//! }
//! ```

pub mod config;
pub mod errors;
pub mod item;
pub mod storage;
pub mod store;

pub use errors::StorageError;
pub use item::HistoryItem;
pub use storage::Storage;
pub use store::{HISTORY_CAP, HISTORY_KEY, HistoryStore};
