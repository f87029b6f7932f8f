//! Ask → answer → optional feedback.
//!
//! The question is validated before any network call. The history record is
//! written only once the response is known; failed queries leave history untouched.

use std::sync::Arc;

use history_store::{HistoryItem, HistoryStore};
use rag_gateway::QaBackend;
use rag_gateway::models::{FeedbackRating, FeedbackRequest, QueryRequest, QueryResponse};
use tracing::{debug, info, instrument, warn};

use crate::confirm::Confirm;
use crate::errors::{Result, SessionError};

/// A completed exchange: what was asked, what came back, how it was recorded.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub question: String,
    pub response: QueryResponse,
    pub item: HistoryItem,
}

/// Result of a feedback submission. Never retried.
#[derive(Debug)]
pub enum FeedbackOutcome {
    /// Stored by the backend under `id`.
    Recorded { id: String },
    /// The backend answered but reported `ok = false`.
    Declined { id: String },
    /// The submission failed; the user may try again manually.
    Failed(rag_gateway::GatewayError),
}

impl FeedbackOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, FeedbackOutcome::Recorded { .. })
    }
}

pub struct QuerySession {
    backend: Arc<dyn QaBackend>,
    history: Arc<HistoryStore>,
    last: Option<Exchange>,
}

impl QuerySession {
    pub fn new(backend: Arc<dyn QaBackend>, history: Arc<HistoryStore>) -> Self {
        Self {
            backend,
            history,
            last: None,
        }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// The most recent successful exchange, if any.
    pub fn last(&self) -> Option<&Exchange> {
        self.last.as_ref()
    }

    /// Asks `question` and records the answer.
    ///
    /// # Errors
    /// - [`SessionError::Validation`] for a blank question or zero `top_k`; no request is sent.
    /// - [`SessionError::Gateway`] if the query fails; history is not modified.
    #[instrument(skip_all, fields(top_k = ?top_k))]
    pub async fn ask(&mut self, question: &str, top_k: Option<u32>) -> Result<&Exchange> {
        let req = QueryRequest::new(question.trim(), top_k)?;
        self.last = None;

        let response = self.backend.query(&req).await?;
        info!(
            trace_id = %response.trace_id,
            degraded = response.degraded,
            sources = response.sources.len(),
            "answer received"
        );

        let item = self.history.record(req.question(), &response);
        debug!(id = %item.id, "history recorded");
        let exchange = self.last.insert(Exchange {
            question: req.question().to_string(),
            response,
            item,
        });
        Ok(&*exchange)
    }

    /// Rates the most recent answer, echoing its trace id and error code.
    ///
    /// Transport failures are returned as [`FeedbackOutcome::Failed`] rather than
    /// an error, so the caller can notify and move on.
    ///
    /// # Errors
    /// [`SessionError::NoActiveAnswer`] if nothing has been answered in this session.
    pub async fn submit_feedback(
        &self,
        rating: FeedbackRating,
        comment: Option<String>,
    ) -> Result<FeedbackOutcome> {
        let exchange = self.last.as_ref().ok_or(SessionError::NoActiveAnswer)?;
        let req =
            FeedbackRequest::for_response(&exchange.question, &exchange.response, rating, comment);

        Ok(match self.backend.feedback(&req).await {
            Ok(resp) if resp.ok => {
                info!(id = %resp.id, trace_id = %req.trace_id, "feedback recorded");
                FeedbackOutcome::Recorded { id: resp.id }
            }
            Ok(resp) => {
                warn!(id = %resp.id, "feedback not accepted");
                FeedbackOutcome::Declined { id: resp.id }
            }
            Err(e) => {
                warn!(error = %e, "feedback submission failed");
                FeedbackOutcome::Failed(e)
            }
        })
    }

    /// Clears history after explicit confirmation.
    pub fn clear_history(&self, confirm: &dyn Confirm) -> Result<()> {
        if !confirm.confirm("Clear all history? This cannot be undone.") {
            return Err(SessionError::NotConfirmed);
        }
        self.history.clear();
        info!("history cleared");
        Ok(())
    }
}
