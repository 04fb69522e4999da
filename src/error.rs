use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use crate::signing::SigningError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl From<SigningError> for AppError {
    fn from(e: SigningError) -> Self {
        match e {
            // Malformed caller-supplied digest is a client error; key and
            // encoding faults are server-side.
            SigningError::InvalidDigest => AppError::BadRequest(e.to_string()),
            other => AppError::Internal(anyhow::anyhow!(other)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, error_type) = match &self {
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone(), "invalid_request_error")
            }
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized".to_string(),
                "unauthorized",
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), "not_found"),
            AppError::Internal(e) => {
                error!(error = ?e, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                    "internal_error",
                )
            }
        };

        let body = Json(serde_json::json!({
            "error": {
                "message": message,
                "type": error_type,
            }
        }));
        (status, body).into_response()
    }
}
