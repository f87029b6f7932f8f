use serde::{Deserialize, Serialize};

use crate::models::query::QueryResponse;

/// Usefulness verdict for an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackRating {
    Useful,
    Useless,
}

/// Body of `POST /api/feedback`.
///
/// Always built from the response it rates so `trace_id` and `error_code` travel
/// back to the backend unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackRequest {
    pub question: String,
    pub answer: String,
    pub rating: FeedbackRating,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    pub trace_id: String,
}

impl FeedbackRequest {
    /// Builds feedback for `response`, which answered `question`.
    ///
    /// Blank comments are dropped.
    pub fn for_response(
        question: impl Into<String>,
        response: &QueryResponse,
        rating: FeedbackRating,
        comment: Option<String>,
    ) -> Self {
        Self {
            question: question.into(),
            answer: response.answer.clone(),
            rating,
            comment: comment.filter(|c| !c.trim().is_empty()),
            error_code: response.error_code.clone(),
            trace_id: response.trace_id.clone(),
        }
    }
}

/// Success body of `POST /api/feedback`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackResponse {
    pub ok: bool,
    pub id: String,
}
