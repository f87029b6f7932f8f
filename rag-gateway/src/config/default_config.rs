//! Gateway config loaded strictly from environment variables.
//!
//! # Environment variables
//!
//! - `RAG_API_BASE_URL`     = backend base address (optional; empty means same-origin)
//! - `RAG_API_ORIGIN`       = origin used when the base is empty (optional)
//! - `APP_PORT`             = backend port for the default origin (optional, `8080`)
//! - `RAG_API_TIMEOUT_SECS` = request timeout in seconds (optional, `30`)

use crate::{
    config::gateway_config::{DEFAULT_TIMEOUT_SECS, GatewayConfig, normalize_base},
    error_handler::{ConfigError, GatewayError, env_opt, env_opt_u64},
};

/// Default backend port, matching the backend's own `APP_PORT` default.
const DEFAULT_APP_PORT: u16 = 8080;

/// Resolves the same-origin address strictly from environment.
///
/// Precedence:
/// 1. `RAG_API_ORIGIN` if present and non-empty
/// 2. `APP_PORT` → `http://127.0.0.1:{port}`
/// 3. `http://127.0.0.1:8080`
///
/// # Errors
///
/// - [`ConfigError::InvalidNumber`] if `APP_PORT` is invalid
fn origin_from_env() -> Result<String, GatewayError> {
    if let Some(origin) = env_opt("RAG_API_ORIGIN") {
        return Ok(normalize_base(&origin));
    }
    let port = match env_opt("APP_PORT") {
        Some(port) => port.parse::<u16>().map_err(|_| ConfigError::InvalidNumber {
            var: "APP_PORT",
            reason: "expected u16 (1..=65535)",
        })?,
        None => DEFAULT_APP_PORT,
    };
    Ok(format!("http://127.0.0.1:{port}"))
}

/// Constructs the gateway config from environment and validates it.
///
/// # Defaults
/// - `timeout_secs = Some(30)`
///
/// # Errors
/// Any [`ConfigError`] raised while parsing or validating the variables.
pub fn config_from_env() -> Result<GatewayConfig, GatewayError> {
    let base = env_opt("RAG_API_BASE_URL").unwrap_or_default();
    let timeout_secs = env_opt_u64("RAG_API_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS);

    let mut cfg = if base.is_empty() {
        GatewayConfig::same_origin(origin_from_env()?)
    } else {
        GatewayConfig::new(base)
    };
    cfg.timeout_secs = Some(timeout_secs);
    cfg.validate()?;
    Ok(cfg)
}
