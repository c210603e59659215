use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Unexpected response format: {0}")]
    Format(String),

    #[error("Listing {index} is missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("Unreadable resume: {0}")]
    DocumentFormat(String),

    #[error("Advice generation failed for '{listing}': {reason}")]
    Generation { listing: String, reason: String },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DocumentFormat(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Network(_)
            | AppError::Format(_)
            | AppError::MissingField { .. }
            | AppError::Generation { .. } => StatusCode::BAD_GATEWAY,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Network(_) => "NETWORK_ERROR",
            AppError::Timeout(_) => "TIMEOUT",
            AppError::Format(_) => "FORMAT_ERROR",
            AppError::MissingField { .. } => "MISSING_FIELD",
            AppError::DocumentFormat(_) => "DOCUMENT_FORMAT_ERROR",
            AppError::Generation { .. } => "GENERATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to the caller. Internal errors are logged, not echoed.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
            }
            AppError::Network(_)
            | AppError::Format(_)
            | AppError::MissingField { .. }
            | AppError::Generation { .. }
            | AppError::Timeout(_) => {
                tracing::error!("Upstream error: {self}");
                self.to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.public_message()
            }
        }));

        (status, body).into_response()
    }
}
