use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::submission::id::RecordId;
use crate::submission::record::RecordKind;
use crate::submission::validate::ValidationError;

pub const INTERNAL_MESSAGE: &str =
    "An error occurred while processing your submission. Please try again.";

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    PayloadTooLarge,
    Validation(ValidationError),
    RateLimited(u64),
    Internal(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            AppError::PayloadTooLarge => write!(f, "Payload Too Large"),
            AppError::Validation(err) => write!(f, "Validation failed: {err}"),
            AppError::RateLimited(secs) => write!(f, "Rate Limited: retry after {secs}s"),
            AppError::Internal(msg) => write!(f, "Internal Error: {msg}"),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Submission is too large.".to_string(),
            ),
            AppError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::RateLimited(secs) => (
                StatusCode::TOO_MANY_REQUESTS,
                format!("Too many submissions. Please try again in {secs} seconds."),
            ),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        let body = json!({ "success": false, "error": message });
        (status, axum::Json(body)).into_response()
    }
}

/// A failed submission, echoing the record id when one was already minted.
#[derive(Debug)]
pub struct SubmissionError {
    pub kind: RecordKind,
    pub id: Option<RecordId>,
    pub error: AppError,
}

impl SubmissionError {
    pub fn new(kind: RecordKind, error: impl Into<AppError>) -> Self {
        Self {
            kind,
            id: None,
            error: error.into(),
        }
    }

    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }
}

impl std::fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{} submission {id}: {}", self.kind.as_str(), self.error),
            None => write!(f, "{} submission: {}", self.kind.as_str(), self.error),
        }
    }
}

impl IntoResponse for SubmissionError {
    fn into_response(self) -> Response {
        let (status, message) = self.error.status_and_message();
        let mut body = json!({ "success": false, "error": message });
        if let Some(id) = &self.id {
            body[self.kind.id_field()] = json!(id);
        }
        (status, axum::Json(body)).into_response()
    }
}
