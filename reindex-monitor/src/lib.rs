//! Observes a backend reindex job from start to a terminal state.
//!
//! ```no_run
//! # async fn demo(backend: std::sync::Arc<dyn rag_gateway::QaBackend>) {
//! use reindex_monitor::{JobMonitor, PollPolicy};
//! use rag_gateway::models::ReindexRequest;
//!
//! let monitor = JobMonitor::new(backend, PollPolicy::default());
//! monitor.start(ReindexRequest::default()).await.ok();
//! let done = monitor.settled().await;
//! println!("{}", done.phase.label());
//! # }
//! ```

pub mod config;
pub mod errors;
pub mod monitor;
pub mod state;

pub use config::PollPolicy;
pub use errors::MonitorError;
pub use monitor::JobMonitor;
pub use state::{AbandonReason, MonitorPhase, MonitorState};
