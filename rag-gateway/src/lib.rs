//! Typed gateway to the question answering backend.
//!
//! - [`backend::QaBackend`]: one async operation per backend action
//! - [`api_client::ApiClient`]: the `reqwest` implementation
//! - [`models`]: request/response shapes of the HTTP contract
//! - [`error_handler`]: [`GatewayError`] taxonomy and env helpers
//! - [`config`]: base address resolution
//! - [`telemetry`]: `tracing-subscriber` layer shared by the workspace

pub mod api_client;
pub mod backend;
pub mod config;
pub mod error_handler;
pub mod models;
pub mod telemetry;

pub use api_client::ApiClient;
pub use backend::QaBackend;
pub use config::gateway_config::GatewayConfig;
pub use error_handler::{ConfigError, GatewayError, ValidationError};
