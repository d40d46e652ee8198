use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use phantom_core::error::CoreError;
use phantom_core::generation::{JobError, ValidationError};
use phantom_core::generation::result::GLYPH_FAILURE;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain errors from `phantom_core` and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce consistent JSON error
/// responses of the form `{ "error": ..., "code": ... }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `phantom_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Job parameters rejected before launch.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The job slot is held by another launch.
    #[error(transparent)]
    Job(#[from] JobError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
            },

            // --- Generation errors ---
            AppError::Validation(reason) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                format!("{GLYPH_FAILURE} {reason}"),
            ),
            AppError::Job(err) => (StatusCode::CONFLICT, "JOB_RUNNING", err.to_string()),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
