//! Wire models for the backend HTTP contract.
//!
//! One file per endpoint family. Every type mirrors the JSON shape exchanged with
//! the backend; optional fields tolerate being absent on input.

pub mod error_code;
pub mod feedback;
pub mod health;
pub mod query;
pub mod reindex;
pub mod status;

pub use error_code::ErrorCode;
pub use feedback::{FeedbackRating, FeedbackRequest, FeedbackResponse};
pub use health::HealthResponse;
pub use query::{DEFAULT_TOP_K, QueryRequest, QueryResponse, QuerySource};
pub use reindex::{
    JobInfo, JobResult, JobStatus, ReindexRequest, ReindexResponse, ReindexStatusResponse,
};
pub use status::{RateLimitState, StatusSnapshot, UpstreamHealth};
