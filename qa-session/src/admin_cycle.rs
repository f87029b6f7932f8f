//! Trigger reindex → observe progress → refresh the status summary.

use std::sync::Arc;
use std::time::Instant;

use rag_gateway::QaBackend;
use rag_gateway::models::{JobInfo, ReindexRequest, StatusSnapshot};
use reindex_monitor::{JobMonitor, MonitorPhase, MonitorState, PollPolicy};
use tracing::{debug, info, warn};

use crate::confirm::Confirm;
use crate::errors::{Result, SessionError};

/// Outcome of a health probe. Produced even when the backend is down.
#[derive(Debug, Clone)]
pub struct HealthReport {
    /// Resolved `/health` address.
    pub endpoint: String,
    pub ok: bool,
    /// Status string reported by the backend, if it answered.
    pub status: Option<String>,
    pub latency_ms: u128,
    pub message: String,
}

/// Final view of an administrative cycle.
#[derive(Debug, Clone)]
pub struct Settlement {
    pub state: MonitorState,
    /// Fresh summary, present when the job reached a terminal status and the
    /// refresh succeeded.
    pub status: Option<StatusSnapshot>,
}

pub struct AdminSession {
    backend: Arc<dyn QaBackend>,
    monitor: JobMonitor,
    endpoint: String,
}

impl AdminSession {
    /// `endpoint` is only used to label health reports.
    pub fn new(backend: Arc<dyn QaBackend>, policy: PollPolicy, endpoint: impl Into<String>) -> Self {
        Self {
            monitor: JobMonitor::new(backend.clone(), policy),
            backend,
            endpoint: endpoint.into(),
        }
    }

    pub fn monitor(&self) -> &JobMonitor {
        &self.monitor
    }

    pub async fn refresh_status(&self) -> Result<StatusSnapshot> {
        Ok(self.backend.status().await?)
    }

    /// Reads the backend's current job once without polling.
    ///
    /// Any failure degrades to `None`: the endpoint may be missing on older backends.
    pub async fn load_current_job(&self) -> Option<JobInfo> {
        match self.backend.reindex_status().await {
            Ok(resp) => resp.job,
            Err(e) => {
                debug!(error = %e, "current job unavailable");
                None
            }
        }
    }

    /// Starts a reindex job after explicit confirmation and begins polling.
    ///
    /// # Errors
    /// - [`SessionError::NotConfirmed`] if the user declined; nothing is sent.
    /// - [`SessionError::Monitor`] if a job is already observed or the start failed.
    pub async fn trigger_reindex(
        &self,
        confirm: &dyn Confirm,
        incremental: bool,
    ) -> Result<JobInfo> {
        let prompt = if incremental {
            "Start an incremental reindex of the knowledge base?"
        } else {
            "Reindex the knowledge base? This may take several minutes."
        };
        if !confirm.confirm(prompt) {
            return Err(SessionError::NotConfirmed);
        }
        let req = if incremental {
            ReindexRequest::incremental()
        } else {
            ReindexRequest::default()
        };
        Ok(self.monitor.start(req).await?)
    }

    /// Waits for the observed job to settle, then refreshes the status summary
    /// if the job reached `completed` or `failed`.
    ///
    /// An abandoned job leaves the summary as is; a failed refresh is logged.
    pub async fn settle(&self) -> Settlement {
        let state = self.monitor.settled().await;
        let status = match state.phase {
            MonitorPhase::Completed | MonitorPhase::Failed => match self.backend.status().await {
                Ok(snapshot) => {
                    info!(index_size = snapshot.index_size, "status refreshed after reindex");
                    Some(snapshot)
                }
                Err(e) => {
                    warn!(error = %e, "status refresh after reindex failed");
                    None
                }
            },
            _ => None,
        };
        Settlement { state, status }
    }

    /// Stops observing the current job.
    pub async fn teardown(&self) {
        self.monitor.cancel().await;
    }

    /// Checks backend liveness. Never fails.
    pub async fn probe(&self) -> HealthReport {
        let t0 = Instant::now();
        let result = self.backend.health().await;
        let latency_ms = t0.elapsed().as_millis();

        match result {
            Ok(h) if h.is_ok() => HealthReport {
                endpoint: self.endpoint.clone(),
                ok: true,
                message: format!("backend healthy ({})", h.status),
                status: Some(h.status),
                latency_ms,
            },
            Ok(h) => HealthReport {
                endpoint: self.endpoint.clone(),
                ok: false,
                message: format!("backend reports {}", h.status),
                status: Some(h.status),
                latency_ms,
            },
            Err(e) => {
                warn!(error = %e, "health probe failed");
                HealthReport {
                    endpoint: self.endpoint.clone(),
                    ok: false,
                    status: None,
                    latency_ms,
                    message: e.to_string(),
                }
            }
        }
    }
}
