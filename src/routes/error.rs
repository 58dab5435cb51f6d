use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::services::tracker::TrackerError;

/// Error type for HTTP handlers, rendered as the `{"error": ...}` JSON
/// shape the polling clients expect.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The upload was missing, empty, or not a decodable image.
    #[error("{0}")]
    InvalidInput(String),

    /// Unknown job id.
    #[error("Job not found")]
    NotFound,

    /// The result was requested before the job completed.
    #[error("Job has not completed yet")]
    NotReady,

    /// Unexpected internal failure; details stay in the logs.
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Job not found".to_string()),
            ApiError::NotReady => (
                StatusCode::BAD_REQUEST,
                "Job has not completed yet".to_string(),
            ),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<TrackerError> for ApiError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::NotFound => ApiError::NotFound,
            TrackerError::NotReady => ApiError::NotReady,
            TrackerError::Storage(e) => ApiError::Internal(e.to_string()),
        }
    }
}
