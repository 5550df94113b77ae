//! Mapping of orchestrator errors to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use musify_core::OrchestratorError;

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// An error returned from a handler.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<OrchestratorError> for ApiError {
    fn from(err: OrchestratorError) -> Self {
        match err {
            OrchestratorError::InvalidInput(_) => {
                Self::new(StatusCode::BAD_REQUEST, "Invalid Spotify URL")
            }
            OrchestratorError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "Job not found"),
            OrchestratorError::NotCompleted { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "Download not complete")
            }
            OrchestratorError::ArchiveMissing(_) => {
                Self::new(StatusCode::NOT_FOUND, "ZIP file not found")
            }
            other => {
                error!("Request failed: {}", other);
                Self::internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}
