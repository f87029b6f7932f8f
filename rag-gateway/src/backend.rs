//! The seam between the gateway and everything that drives it.
//!
//! [`QaBackend`] lists one operation per logical backend action. [`ApiClient`]
//! is the HTTP implementation; the job monitor and session orchestrator only see
//! the trait, so tests can script responses without a server.
//!
//! No operation retries on its own. Retry policy belongs to the caller.
//!
//! [`ApiClient`]: crate::api_client::ApiClient

use async_trait::async_trait;

use crate::error_handler::Result;
use crate::models::{
    FeedbackRequest, FeedbackResponse, HealthResponse, QueryRequest, QueryResponse,
    ReindexRequest, ReindexResponse, ReindexStatusResponse, StatusSnapshot,
};

/// Logical operations exposed by the question answering backend.
///
/// | Method | HTTP |
/// |--------|------|
/// | [`query`](QaBackend::query) | `POST /api/query` |
/// | [`feedback`](QaBackend::feedback) | `POST /api/feedback` |
/// | [`status`](QaBackend::status) | `GET /api/status` |
/// | [`reindex_start`](QaBackend::reindex_start) | `POST /api/reindex` |
/// | [`reindex_status`](QaBackend::reindex_status) | `GET /api/reindex` |
/// | [`health`](QaBackend::health) | `GET /health` |
#[async_trait]
pub trait QaBackend: Send + Sync {
    async fn query(&self, req: &QueryRequest) -> Result<QueryResponse>;

    async fn feedback(&self, req: &FeedbackRequest) -> Result<FeedbackResponse>;

    async fn status(&self) -> Result<StatusSnapshot>;

    async fn reindex_start(&self, req: ReindexRequest) -> Result<ReindexResponse>;

    /// Current job snapshot; `job` is `None` when the backend has none.
    async fn reindex_status(&self) -> Result<ReindexStatusResponse>;

    async fn health(&self) -> Result<HealthResponse>;
}
