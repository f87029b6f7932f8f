use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a backend reindex job. `Running` transitions at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Running)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

/// Counters reported by the indexer once a job reaches a terminal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResult {
    pub total_files: u64,
    pub indexed_files: u64,
    pub skipped_files: u64,
    pub failed_files: u64,
    pub total_chunks: u64,
    pub successful_chunks: u64,
    pub failed_chunks: u64,
    pub deleted_chunks: u64,
    pub duration_ms: u64,
}

impl JobResult {
    /// Share of chunks embedded successfully; `None` if no chunks were processed.
    pub fn chunk_success_ratio(&self) -> Option<f64> {
        (self.total_chunks > 0).then(|| self.successful_chunks as f64 / self.total_chunks as f64)
    }
}

/// Snapshot of a reindex job as last reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInfo {
    pub job_id: String,
    pub status: JobStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub result: Option<JobResult>,
    #[serde(default)]
    pub error: Option<String>,
}

impl JobInfo {
    /// Client-side placeholder for a job the backend just accepted.
    pub fn provisional(job_id: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobStatus::Running,
            started_at,
            ended_at: None,
            result: None,
            error: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Body of `POST /api/reindex`.
///
/// Serializes to `{}` unless an explicit mode was requested; the backend treats
/// an absent `full` as a full rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReindexRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full: Option<bool>,
}

impl ReindexRequest {
    pub fn incremental() -> Self {
        Self { full: Some(false) }
    }
}

/// Success body of `POST /api/reindex`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReindexResponse {
    pub job_id: String,
    #[serde(default)]
    pub message: String,
}

/// Success body of `GET /api/reindex`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReindexStatusResponse {
    #[serde(default)]
    pub job: Option<JobInfo>,
}
