//! Unified error handling for `rag-gateway`.
//!
//! This module exposes a single top-level error type [`GatewayError`] for every
//! gateway operation, and groups domain-specific errors in nested enums
//! ([`ConfigError`], [`ValidationError`]). Small helpers for reading/validating
//! environment variables are provided and return the unified [`Result<T>`] alias.
//!
//! All messages include the suffix `[RAG Gateway]` to simplify attribution in logs.
//!
//! The split between [`GatewayError::NetworkUnreachable`] and
//! [`GatewayError::RequestFailed`] matters to callers: the former means the backend
//! process could not be reached at all, the latter means it answered with a
//! non-success HTTP status.

use thiserror::Error;

/* ------------------------------------------------------------------------- */
/* Public result alias                                                       */
/* ------------------------------------------------------------------------- */

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, GatewayError>;

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for the `rag-gateway` crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration/validation errors (startup).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Request value rejected before any network call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The backend could not be reached at all (connection refused, DNS, timeout).
    #[error("[RAG Gateway] network error: cannot reach backend at {target_url} ({reason})")]
    NetworkUnreachable {
        /// Fully resolved request URL.
        target_url: String,
        /// Transport-level cause.
        reason: String,
    },

    /// The backend answered with a non-success HTTP status.
    #[error("[RAG Gateway] request failed: HTTP {status} {status_text} from {url}")]
    RequestFailed {
        /// Numeric HTTP status code.
        status: u16,
        /// Canonical reason phrase (may be empty for non-standard codes).
        status_text: String,
        /// Request URL.
        url: String,
        /// Short snippet of the response body (trimmed).
        snippet: String,
    },

    /// A success response whose body could not be decoded.
    #[error("[RAG Gateway] decode error from {url}: {reason}")]
    Decode {
        /// Request URL.
        url: String,
        /// Decoder message.
        reason: String,
    },

    /// HTTP client could not be constructed.
    #[error("[RAG Gateway] client error: {0}")]
    Client(#[source] reqwest::Error),
}

impl GatewayError {
    /// `true` if the backend process itself was unreachable.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, GatewayError::NetworkUnreachable { .. })
    }

    /// `true` for HTTP 409, which the reindex endpoint uses for "job in progress".
    pub fn is_conflict(&self) -> bool {
        matches!(self, GatewayError::RequestFailed { status: 409, .. })
    }
}

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for environment/config-driven setup.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Required environment variable is missing or empty.
    #[error("[RAG Gateway] missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// A number failed to parse (like ports, timeouts, intervals).
    #[error("[RAG Gateway] invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g., `RAG_API_TIMEOUT_SECS`).
        var: &'static str,
        /// Human-readable reason (e.g., `expected u64`).
        reason: &'static str,
    },

    /// Value had the wrong format (e.g., invalid URL).
    #[error("[RAG Gateway] invalid format in {var}: {reason}")]
    InvalidFormat {
        /// Variable name (e.g., `RAG_API_BASE_URL`).
        var: &'static str,
        /// Explanation (e.g., `must start with http:// or https://`).
        reason: &'static str,
    },

    /// A numeric field was outside of the allowed range.
    #[error("[RAG Gateway] {field} is out of range: {detail}")]
    OutOfRange {
        /// Field name (e.g., `poll_interval_ms`).
        field: &'static str,
        /// Description of the expected range.
        detail: &'static str,
    },
}

/* ------------------------------------------------------------------------- */
/* Validation errors                                                         */
/* ------------------------------------------------------------------------- */

/// Client-side request validation failures. Raised before any network call.
#[non_exhaustive]
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Question text is empty or whitespace only.
    #[error("[RAG Gateway] question must not be empty")]
    EmptyQuestion,

    /// `top_k` must be a positive integer.
    #[error("[RAG Gateway] top_k must be greater than zero")]
    InvalidTopK,
}

/* ------------------------------------------------------------------------- */
/* Env helpers (return unified `Result<T>`)                                  */
/* ------------------------------------------------------------------------- */

/// Reads an optional environment variable, trimmed (`None` if unset/empty).
pub fn env_opt(name: &'static str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses an optional `u64` from env (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`GatewayError::Config`] with [`ConfigError::InvalidNumber`] if the
/// variable is set but not a valid `u64`.
pub fn env_opt_u64(name: &'static str) -> Result<Option<u64>> {
    match env_opt(name) {
        Some(v) => v.parse::<u64>().map(Some).map_err(|_| {
            GatewayError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u64",
            })
        }),
        None => Ok(None),
    }
}

/* ------------------------------------------------------------------------- */
/* Validation helpers                                                        */
/* ------------------------------------------------------------------------- */

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
///
/// # Errors
/// Returns [`GatewayError::Config`] with [`ConfigError::InvalidFormat`] when
/// the string does not start with a valid HTTP scheme.
pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        }
        .into())
    }
}

/// Trims a response body to a short, single-line snippet for logs and errors.
pub fn make_snippet(text: &str) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    flat.trim().chars().take(240).collect()
}
