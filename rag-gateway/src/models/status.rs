use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health of the inference upstream as seen by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamHealth {
    Ok,
    Degraded,
    Unavailable,
    /// Any value this client does not recognise.
    #[serde(other)]
    Unknown,
}

/// Requests-per-minute accounting reported by the backend.
///
/// `current_rpm <= rpm_limit` by convention only; nothing here enforces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitState {
    pub rpm_limit: u32,
    pub current_rpm: u32,
}

impl RateLimitState {
    /// Fraction of the limit in use; `None` when the limit is zero.
    pub fn utilization(&self) -> Option<f64> {
        (self.rpm_limit > 0).then(|| f64::from(self.current_rpm) / f64::from(self.rpm_limit))
    }
}

/// Success body of `GET /api/status`. Read-only, refreshed on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub provider: String,
    pub model: String,
    /// Number of indexed documents.
    pub index_size: u64,
    #[serde(default)]
    pub last_index_time: Option<DateTime<Utc>>,
    pub upstream_health: UpstreamHealth,
    pub rate_limit_state: RateLimitState,
    pub qdrant_connected: bool,
}
