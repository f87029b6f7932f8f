use rag_gateway::GatewayError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MonitorError>;

/// Failures surfaced by [`JobMonitor::start`](crate::JobMonitor::start).
///
/// Poll failures are not errors: they end in
/// [`MonitorPhase::Abandoned`](crate::MonitorPhase::Abandoned).
#[derive(Debug, Error)]
pub enum MonitorError {
    /// A job is already starting or being polled by this monitor.
    #[error("[Reindex Monitor] a reindex job is already being observed")]
    AlreadyRunning,

    /// The backend refused or never received the start request.
    #[error("[Reindex Monitor] failed to start reindex: {0}")]
    Start(#[source] GatewayError),

    /// The monitor was cancelled before the backend accepted the job.
    #[error("[Reindex Monitor] reindex start cancelled")]
    Cancelled,
}

impl MonitorError {
    /// `true` if the backend reported a job already in progress (HTTP 409).
    pub fn is_backend_conflict(&self) -> bool {
        matches!(self, MonitorError::Start(e) if e.is_conflict())
    }
}
