//! User-facing cycles over the gateway, the history ledger and the job monitor.
//!
//! - [`QuerySession`]: ask, record, rate
//! - [`AdminSession`]: confirm, reindex, watch, refresh, probe

pub mod admin_cycle;
pub mod confirm;
pub mod errors;
pub mod query_cycle;

pub use admin_cycle::{AdminSession, HealthReport, Settlement};
pub use confirm::{AssumeYes, Confirm};
pub use errors::SessionError;
pub use query_cycle::{Exchange, FeedbackOutcome, QuerySession};
