use rag_gateway::{GatewayError, ValidationError};
use reindex_monitor::MonitorError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors surfaced to the presentation layer.
///
/// Storage failures and job abandonment never appear here; they are absorbed by the
/// history store and the job monitor.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Monitor(#[from] MonitorError),

    /// Feedback was requested before any answer was received.
    #[error("[QA Session] there is no answer to rate yet")]
    NoActiveAnswer,

    /// The user declined a destructive or long-running action.
    #[error("[QA Session] action not confirmed")]
    NotConfirmed,
}

impl SessionError {
    /// `true` if the backend could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        match self {
            SessionError::Gateway(e) => e.is_unreachable(),
            SessionError::Monitor(MonitorError::Start(e)) => e.is_unreachable(),
            _ => false,
        }
    }
}
