use serde::{Deserialize, Serialize};

use crate::error_handler::ValidationError;
use crate::models::error_code::ErrorCode;

/// Number of sources requested when the caller does not specify one.
pub const DEFAULT_TOP_K: u32 = 6;

/// Body of `POST /api/query`. Validated on construction and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryRequest {
    question: String,
    top_k: u32,
}

impl QueryRequest {
    /// Builds a request, defaulting `top_k` to [`DEFAULT_TOP_K`].
    ///
    /// # Errors
    /// - [`ValidationError::EmptyQuestion`] if the question is blank
    /// - [`ValidationError::InvalidTopK`] if `top_k` is `Some(0)`
    pub fn new(question: impl Into<String>, top_k: Option<u32>) -> Result<Self, ValidationError> {
        let question = question.into();
        if question.trim().is_empty() {
            return Err(ValidationError::EmptyQuestion);
        }
        let top_k = top_k.unwrap_or(DEFAULT_TOP_K);
        if top_k == 0 {
            return Err(ValidationError::InvalidTopK);
        }
        Ok(Self { question, top_k })
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn top_k(&self) -> u32 {
        self.top_k
    }
}

/// One ranked citation backing an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySource {
    pub title: String,
    pub path: String,
    pub snippet: String,
    /// Relevance in `[0, 1]`.
    pub score: f64,
}

impl QuerySource {
    /// Relevance as a whole percentage, clamped to `0..=100`.
    pub fn relevance_percent(&self) -> u32 {
        (self.score.clamp(0.0, 1.0) * 100.0).round() as u32
    }
}

/// Success body of `POST /api/query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    /// Ranked, most relevant first.
    #[serde(default)]
    pub sources: Vec<QuerySource>,
    #[serde(default)]
    pub degraded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    pub trace_id: String,
}

impl QueryResponse {
    /// Typed view of `error_code`, if the backend supplied one.
    pub fn error_code_kind(&self) -> Option<ErrorCode> {
        self.error_code.as_deref().map(ErrorCode::from_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_top_k_and_serializes_both_fields() {
        let req = QueryRequest::new("What is the retry policy?", None).unwrap();
        assert_eq!(req.top_k(), DEFAULT_TOP_K);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "question": "What is the retry policy?", "top_k": 6 })
        );
    }

    #[test]
    fn request_rejects_blank_question_and_zero_top_k() {
        assert_eq!(
            QueryRequest::new("   \n", None),
            Err(ValidationError::EmptyQuestion)
        );
        assert_eq!(QueryRequest::new("q", Some(0)), Err(ValidationError::InvalidTopK));
        assert_eq!(QueryRequest::new("q", Some(3)).unwrap().top_k(), 3);
    }

    #[test]
    fn response_tolerates_missing_optional_fields() {
        let resp: QueryResponse = serde_json::from_str(
            r#"{"answer":"Retries use exponential backoff.","trace_id":"t1"}"#,
        )
        .unwrap();
        assert!(resp.sources.is_empty());
        assert!(!resp.degraded);
        assert_eq!(resp.error_code, None);
        assert_eq!(resp.error_code_kind(), None);
    }

    #[test]
    fn degraded_response_exposes_typed_code() {
        let resp: QueryResponse = serde_json::from_str(
            r#"{"answer":"fallback","sources":[{"title":"T","path":"docs/a.md","snippet":"s","score":0.876}],
                "degraded":true,"error_code":"UPSTREAM_TIMEOUT","trace_id":"t2"}"#,
        )
        .unwrap();
        assert_eq!(resp.error_code_kind(), Some(ErrorCode::UpstreamTimeout));
        assert_eq!(resp.sources[0].relevance_percent(), 88);
    }

    #[test]
    fn relevance_is_clamped() {
        let mut s = QuerySource {
            title: String::new(),
            path: String::new(),
            snippet: String::new(),
            score: 1.7,
        };
        assert_eq!(s.relevance_percent(), 100);
        s.score = -0.2;
        assert_eq!(s.relevance_percent(), 0);
    }
}
