use serde::{Deserialize, Serialize};

/// One recorded question/answer exchange. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    /// `<epoch millis>-<random hex>`; unique within one ledger.
    pub id: String,
    pub question: String,
    pub answer: String,
    /// Creation time, epoch milliseconds.
    pub timestamp: i64,
    pub degraded: bool,
}

/// Builds a time-based id with a random tie-breaker for same-millisecond records.
pub(crate) fn generate_id(timestamp_ms: i64) -> String {
    format!("{timestamp_ms}-{:08x}", rand::random::<u32>())
}
