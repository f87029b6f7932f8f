use std::fmt;

/// Business error codes the backend attaches to degraded answers.
///
/// Unknown codes are kept verbatim in [`ErrorCode::Other`] so newer backends
/// never break decoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    UpstreamTimeout,
    UpstreamRateLimit,
    UpstreamAuth,
    UpstreamUnavailable,
    UpstreamError,
    RetrievalFailed,
    NoMatch,
    InternalError,
    Other(String),
}

impl ErrorCode {
    /// Parses the wire representation (e.g. `UPSTREAM_TIMEOUT`).
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "UPSTREAM_TIMEOUT" => ErrorCode::UpstreamTimeout,
            "UPSTREAM_RATE_LIMIT" => ErrorCode::UpstreamRateLimit,
            "UPSTREAM_AUTH" => ErrorCode::UpstreamAuth,
            "UPSTREAM_UNAVAILABLE" => ErrorCode::UpstreamUnavailable,
            "UPSTREAM_ERROR" => ErrorCode::UpstreamError,
            "RETRIEVAL_FAILED" => ErrorCode::RetrievalFailed,
            "NO_MATCH" => ErrorCode::NoMatch,
            "INTERNAL_ERROR" => ErrorCode::InternalError,
            other => ErrorCode::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::UpstreamTimeout => "UPSTREAM_TIMEOUT",
            ErrorCode::UpstreamRateLimit => "UPSTREAM_RATE_LIMIT",
            ErrorCode::UpstreamAuth => "UPSTREAM_AUTH",
            ErrorCode::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            ErrorCode::UpstreamError => "UPSTREAM_ERROR",
            ErrorCode::RetrievalFailed => "RETRIEVAL_FAILED",
            ErrorCode::NoMatch => "NO_MATCH",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::Other(code) => code,
        }
    }

    /// Short human-readable explanation for display next to a degraded answer.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::UpstreamTimeout => "inference upstream timed out",
            ErrorCode::UpstreamRateLimit => "inference upstream is rate limiting requests",
            ErrorCode::UpstreamAuth => "inference upstream rejected the credentials",
            ErrorCode::UpstreamUnavailable => "inference upstream is unavailable",
            ErrorCode::UpstreamError => "inference upstream returned an error",
            ErrorCode::RetrievalFailed => "retrieval from the index failed",
            ErrorCode::NoMatch => "no matching documents in the index",
            ErrorCode::InternalError => "internal backend error",
            ErrorCode::Other(_) => "unrecognised backend error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
