//! The bounded history ledger.
//!
//! Newest first, at most [`HISTORY_CAP`] entries, persisted as one JSON array under
//! [`HISTORY_KEY`] after every mutation. Persistence is best-effort: a failed write
//! is logged and remembered but the in-memory change stands for the session.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use rag_gateway::models::QueryResponse;
use tracing::{debug, warn};

use crate::errors::StorageError;
use crate::item::{HistoryItem, generate_id};
use crate::storage::Storage;

/// Storage key of the ledger.
pub const HISTORY_KEY: &str = "qa_history";

/// Maximum number of retained exchanges.
pub const HISTORY_CAP: usize = 100;

#[derive(Debug, Default)]
struct Ledger {
    items: Vec<HistoryItem>,
    last_persist_error: Option<String>,
}

/// Newest-first, capped record of past exchanges.
pub struct HistoryStore {
    storage: Arc<dyn Storage>,
    ledger: Mutex<Ledger>,
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore").finish_non_exhaustive()
    }
}

impl HistoryStore {
    /// Opens the ledger from `storage`.
    ///
    /// Missing, unreadable or corrupt data yields an empty ledger; the cause is logged.
    pub fn open(storage: Arc<dyn Storage>) -> Self {
        let items = match load(storage.as_ref()) {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "history unreadable, starting empty");
                Vec::new()
            }
        };
        debug!(count = items.len(), "history loaded");
        Self {
            storage,
            ledger: Mutex::new(Ledger {
                items,
                last_persist_error: None,
            }),
        }
    }

    /// Records a completed exchange at the front of the ledger.
    ///
    /// Evicts the oldest entries beyond [`HISTORY_CAP`], then persists.
    pub fn record(&self, question: &str, response: &QueryResponse) -> HistoryItem {
        let mut ledger = self.lock();
        let timestamp = Utc::now().timestamp_millis();
        let mut id = generate_id(timestamp);
        while ledger.items.iter().any(|it| it.id == id) {
            id = generate_id(timestamp);
        }

        let item = HistoryItem {
            id,
            question: question.to_string(),
            answer: response.answer.clone(),
            timestamp,
            degraded: response.degraded,
        };
        ledger.items.insert(0, item.clone());
        ledger.items.truncate(HISTORY_CAP);
        self.persist(&mut ledger);
        item
    }

    /// Snapshot of all items, newest first.
    pub fn list(&self) -> Vec<HistoryItem> {
        self.lock().items.clone()
    }

    pub fn get(&self, id: &str) -> Option<HistoryItem> {
        self.lock().items.iter().find(|it| it.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    /// Removes the item with `id`. Returns whether anything was removed.
    ///
    /// Removing an unknown id is a no-op and does not touch storage.
    pub fn remove(&self, id: &str) -> bool {
        let mut ledger = self.lock();
        let before = ledger.items.len();
        ledger.items.retain(|it| it.id != id);
        if ledger.items.len() == before {
            return false;
        }
        self.persist(&mut ledger);
        true
    }

    /// Empties the ledger and drops the stored record; a reopened store starts empty.
    pub fn clear(&self) {
        let mut ledger = self.lock();
        ledger.items.clear();
        let result = self.storage.remove(HISTORY_KEY);
        note_persisted(&mut ledger, result);
    }

    /// Message of the most recent failed write, cleared by the next successful one.
    pub fn last_persist_error(&self) -> Option<String> {
        self.lock().last_persist_error.clone()
    }

    fn persist(&self, ledger: &mut Ledger) {
        let result = serde_json::to_string(&ledger.items)
            .map_err(StorageError::from)
            .and_then(|json| self.storage.set(HISTORY_KEY, &json));
        note_persisted(ledger, result);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn note_persisted(ledger: &mut Ledger, result: Result<(), StorageError>) {
    match result {
        Ok(()) => ledger.last_persist_error = None,
        Err(e) => {
            warn!(error = %e, count = ledger.items.len(), "history not persisted");
            ledger.last_persist_error = Some(e.to_string());
        }
    }
}

fn load(storage: &dyn Storage) -> Result<Vec<HistoryItem>, StorageError> {
    let Some(raw) = storage.get(HISTORY_KEY)? else {
        return Ok(Vec::new());
    };
    let mut items: Vec<HistoryItem> =
        serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
            key: HISTORY_KEY.to_string(),
            reason: e.to_string(),
        })?;
    items.truncate(HISTORY_CAP);
    Ok(items)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::storage::file::FileStorage;
    use crate::storage::memory::MemoryStorage;

    fn response(answer: &str, degraded: bool) -> QueryResponse {
        serde_json::from_value(serde_json::json!({
            "answer": answer,
            "sources": [],
            "degraded": degraded,
            "trace_id": "t"
        }))
        .unwrap()
    }

    fn memory_store() -> (Arc<MemoryStorage>, HistoryStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = HistoryStore::open(storage.clone());
        (storage, store)
    }

    #[test]
    fn record_prepends_and_persists() {
        let (storage, store) = memory_store();
        let first = store.record("What is the retry policy?", &response("Backoff.", false));
        let second = store.record("Second?", &response("Yes.", true));

        let items = store.list();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], second);
        assert_eq!(items[1], first);
        assert!(items[0].degraded);
        assert_eq!(items[1].answer, "Backoff.");

        let raw = storage.get(HISTORY_KEY).unwrap().unwrap();
        let persisted: Vec<HistoryItem> = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted, items);
    }

    #[test]
    fn cap_keeps_newest_hundred() {
        let (_, store) = memory_store();
        for i in 0..105 {
            store.record(&format!("q{i}"), &response("a", false));
        }
        let items = store.list();
        assert_eq!(items.len(), HISTORY_CAP);
        assert_eq!(items[0].question, "q104");
        assert_eq!(items[99].question, "q5");
        assert!(items.iter().all(|it| it.question != "q0"));
    }

    #[test]
    fn ids_are_unique_under_rapid_inserts() {
        let (_, store) = memory_store();
        for _ in 0..HISTORY_CAP {
            store.record("q", &response("a", false));
        }
        let ids: HashSet<_> = store.list().into_iter().map(|it| it.id).collect();
        assert_eq!(ids.len(), HISTORY_CAP);
    }

    #[test]
    fn remove_is_idempotent() {
        let (_, store) = memory_store();
        let a = store.record("a", &response("a", false));
        let b = store.record("b", &response("b", false));

        assert!(store.remove(&a.id));
        assert!(!store.remove(&a.id));
        assert!(!store.remove("no-such-id"));
        assert_eq!(store.list(), vec![b.clone()]);
        assert_eq!(store.get(&b.id), Some(b));
        assert_eq!(store.get(&a.id), None);
    }

    #[test]
    fn clear_drops_stored_record() {
        let (storage, store) = memory_store();
        store.record("a", &response("a", false));
        assert!(storage.get(HISTORY_KEY).unwrap().is_some());

        store.clear();
        assert!(store.is_empty());
        assert_eq!(storage.get(HISTORY_KEY).unwrap(), None);
        assert!(store.last_persist_error().is_none());

        let reopened = HistoryStore::open(storage);
        assert!(reopened.is_empty());
    }

    #[test]
    fn corrupt_data_loads_as_empty() {
        let storage = Arc::new(MemoryStorage::new().with_raw(HISTORY_KEY, "{not json"));
        let store = HistoryStore::open(storage);
        assert!(store.list().is_empty());

        // Still usable afterwards.
        store.record("q", &response("a", false));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn oversized_stored_ledger_is_truncated_on_load() {
        let items: Vec<HistoryItem> = (0..120)
            .map(|i| HistoryItem {
                id: format!("{i}-00000000"),
                question: format!("q{i}"),
                answer: "a".into(),
                timestamp: i,
                degraded: false,
            })
            .collect();
        let raw = serde_json::to_string(&items).unwrap();
        let store = HistoryStore::open(Arc::new(MemoryStorage::new().with_raw(HISTORY_KEY, &raw)));
        assert_eq!(store.len(), HISTORY_CAP);
        assert_eq!(store.list()[0].question, "q0");
    }

    #[test]
    fn persistence_failure_keeps_in_memory_insert() {
        let store = HistoryStore::open(Arc::new(MemoryStorage::with_quota(8)));
        let item = store.record("q", &response("a fairly long answer", false));

        assert_eq!(store.list(), vec![item]);
        let err = store.last_persist_error().unwrap();
        assert!(err.contains("quota"), "{err}");
    }

    #[test]
    fn file_backend_survives_reopen() {
        let tmp = tempfile::TempDir::new().unwrap();
        let recorded = {
            let store = HistoryStore::open(Arc::new(FileStorage::new(tmp.path())));
            store.record("What is the retry policy?", &response("Backoff.", false))
        };

        let reopened = HistoryStore::open(Arc::new(FileStorage::new(tmp.path())));
        assert_eq!(reopened.list(), vec![recorded]);
        assert!(reopened.last_persist_error().is_none());
    }
}
