//! HTTP implementation of [`QaBackend`].
//!
//! Endpoints:
//! - `POST {base}/api/query`   : answer a question
//! - `POST {base}/api/feedback`: rate an answer
//! - `GET  {base}/api/status`  : system/index snapshot
//! - `POST {base}/api/reindex` : start a reindex job
//! - `GET  {base}/api/reindex` : current reindex job
//! - `GET  {base}/health`      : liveness
//!
//! Failures are normalized: transport-level problems become
//! [`GatewayError::NetworkUnreachable`], non-2xx answers become
//! [`GatewayError::RequestFailed`], undecodable bodies become [`GatewayError::Decode`].
//!
//! # Examples
//!
//! ```no_run
//! use rag_gateway::api_client::ApiClient;
//! use rag_gateway::backend::QaBackend;
//! use rag_gateway::config::gateway_config::GatewayConfig;
//! use rag_gateway::models::QueryRequest;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(GatewayConfig::new("http://localhost:8080"))?;
//! let answer = client
//!     .query(&QueryRequest::new("What is the retry policy?", None)?)
//!     .await?;
//! println!("{} ({} sources)", answer.answer, answer.sources.len());
//! # Ok(()) }
//! ```

use std::error::Error as _;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::backend::QaBackend;
use crate::config::gateway_config::{DEFAULT_TIMEOUT_SECS, GatewayConfig};
use crate::error_handler::{GatewayError, Result, make_snippet};
use crate::models::{
    FeedbackRequest, FeedbackResponse, HealthResponse, QueryRequest, QueryResponse,
    ReindexRequest, ReindexResponse, ReindexStatusResponse, StatusSnapshot,
};

const PATH_QUERY: &str = "/api/query";
const PATH_FEEDBACK: &str = "/api/feedback";
const PATH_STATUS: &str = "/api/status";
const PATH_REINDEX: &str = "/api/reindex";
const PATH_HEALTH: &str = "/health";

/// Thin HTTP client for the backend contract.
///
/// Reuses one `reqwest::Client` for every call.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    cfg: GatewayConfig,
}

impl ApiClient {
    /// Creates a client from a validated config.
    ///
    /// # Errors
    /// - [`GatewayError::Config`] if the base/origin is unusable
    /// - [`GatewayError::Client`] if the HTTP client cannot be built
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        cfg.validate()?;

        let timeout = Duration::from_secs(cfg.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(GatewayError::Client)?;

        debug!(
            base = %cfg.effective_base(),
            same_origin = cfg.base_url.is_empty(),
            timeout_secs = timeout.as_secs(),
            "ApiClient initialized"
        );

        Ok(Self { client, cfg })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.cfg
    }

    async fn get_json<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.cfg.url(path);
        let builder = self.client.request(Method::GET, &url);
        self.execute(Method::GET, url, builder).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.cfg.url(path);
        let builder = self.client.request(Method::POST, &url).json(body);
        self.execute(Method::POST, url, builder).await
    }

    /// Sends, checks status, and decodes the JSON body.
    async fn execute<T>(&self, method: Method, url: String, builder: RequestBuilder) -> Result<T>
    where
        T: DeserializeOwned,
    {
        debug!("{} {}", method, url);

        let resp = builder
            .send()
            .await
            .map_err(|e| transport_error(&url, &e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);
            warn!(%method, %url, %status, %snippet, "backend returned non-success status");
            return Err(GatewayError::RequestFailed {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                url,
                snippet,
            });
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| transport_error(&url, &e))?;

        serde_json::from_slice::<T>(&bytes).map_err(|e| {
            warn!(%method, %url, error = %e, "failed to decode backend response");
            GatewayError::Decode {
                url,
                reason: e.to_string(),
            }
        })
    }
}

#[async_trait]
impl QaBackend for ApiClient {
    #[instrument(skip_all, fields(top_k = req.top_k()))]
    async fn query(&self, req: &QueryRequest) -> Result<QueryResponse> {
        self.post_json(PATH_QUERY, req).await
    }

    #[instrument(skip_all, fields(trace_id = %req.trace_id, rating = ?req.rating))]
    async fn feedback(&self, req: &FeedbackRequest) -> Result<FeedbackResponse> {
        self.post_json(PATH_FEEDBACK, req).await
    }

    #[instrument(skip_all)]
    async fn status(&self) -> Result<StatusSnapshot> {
        self.get_json(PATH_STATUS).await
    }

    #[instrument(skip_all, fields(full = ?req.full))]
    async fn reindex_start(&self, req: ReindexRequest) -> Result<ReindexResponse> {
        self.post_json(PATH_REINDEX, &req).await
    }

    #[instrument(skip_all)]
    async fn reindex_status(&self) -> Result<ReindexStatusResponse> {
        self.get_json(PATH_REINDEX).await
    }

    #[instrument(skip_all)]
    async fn health(&self) -> Result<HealthResponse> {
        self.get_json(PATH_HEALTH).await
    }
}

/// Maps a transport failure (no HTTP response) to [`GatewayError::NetworkUnreachable`].
fn transport_error(url: &str, err: &reqwest::Error) -> GatewayError {
    let reason = root_cause(err);
    warn!(
        %url,
        connect = err.is_connect(),
        timeout = err.is_timeout(),
        %reason,
        "backend unreachable"
    );
    GatewayError::NetworkUnreachable {
        target_url: url.to_string(),
        reason,
    }
}

/// Innermost message of an error chain (e.g. `Connection refused (os error 111)`).
fn root_cause(err: &reqwest::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        msg = inner.to_string();
        source = inner.source();
    }
    msg
}
