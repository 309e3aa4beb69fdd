use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::reasoning::step_engine::ReasoningError;
use crate::summarize::orchestrator::SummarizeError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The failure policy aborted a summary run.
    #[error("Failure threshold exceeded: {0}")]
    FailureThreshold(String),

    #[error("No coverage: {0}")]
    NoCoverage(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Run cancelled")]
    Cancelled,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<SummarizeError> for AppError {
    fn from(err: SummarizeError) -> Self {
        match err {
            SummarizeError::InvalidArgument(msg) => AppError::Validation(msg),
            SummarizeError::ThresholdExceeded { .. } => AppError::FailureThreshold(err.to_string()),
            SummarizeError::NoCoverage => AppError::NoCoverage(err.to_string()),
            SummarizeError::ReduceFailed { .. } => AppError::Llm(err.to_string()),
            SummarizeError::Cancelled => AppError::Cancelled,
        }
    }
}

impl From<ReasoningError> for AppError {
    fn from(err: ReasoningError) -> Self {
        match err {
            ReasoningError::InvalidArgument(msg) => AppError::Validation(msg),
            ReasoningError::Completion { .. } => AppError::Llm(err.to_string()),
            ReasoningError::Cancelled => AppError::Cancelled,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::FailureThreshold(msg) => {
                tracing::warn!("Failure policy aborted run: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "FAILURE_THRESHOLD_EXCEEDED",
                    msg.clone(),
                )
            }
            AppError::NoCoverage(msg) => {
                tracing::warn!("No segment produced content: {msg}");
                (StatusCode::BAD_GATEWAY, "NO_COVERAGE", msg.clone())
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Cancelled => (
                StatusCode::CONFLICT,
                "CANCELLED",
                "The run was cancelled".to_string(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
