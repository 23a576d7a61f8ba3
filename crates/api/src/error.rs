use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Upstream failures never reach this layer (they degrade inside the
/// emitter); what is left is local breakage while rendering a response.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Building or encoding the Prometheus registry failed.
    #[error("Metrics exposition failed: {0}")]
    Exposition(#[from] prometheus::Error),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Exposition(err) => {
                tracing::error!(error = %err, "Metrics exposition failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXPOSITION_ERROR",
                    "Failed to render metrics".to_string(),
                )
            }
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
