//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Engine errors map onto HTTP status codes here and nowhere else. Every
//! response, success or failure, uses the [`ApiResponse`] envelope.
//! Internal error details never reach the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use waypost_core::ValidationError;
use waypost_engine::EngineError;

/// The response envelope: `{success, data, message}`.
///
/// Error responses carry `data: null` and a machine-readable `code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// The payload, absent on failure.
    pub data: Option<T>,
    /// Human-readable summary.
    pub message: String,
    /// Machine-readable error code, present only on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl<T> ApiResponse<T> {
    /// A successful envelope around `data`.
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
            code: None,
        }
    }
}

impl ApiResponse<()> {
    /// A failure envelope.
    pub fn failure(code: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: message.into(),
            code: Some(code.to_string()),
        }
    }
}

/// Handler return type for enveloped JSON.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    /// Resource not found (404).
    #[error("{0}")]
    NotFound(String),

    /// Field or attestation validation failed (422).
    #[error("{0}")]
    Validation(String),

    /// Request body or query could not be parsed (400).
    #[error("{0}")]
    BadRequest(String),

    /// Operation not allowed in the record's current status (400).
    #[error("{0}")]
    InvalidState(String),

    /// Missing or invalid token (401).
    #[error("{0}")]
    Unauthorized(String),

    /// Caller does not own the record or lacks the role (403).
    #[error("{0}")]
    Forbidden(String),

    /// Package no longer available for assignment (409).
    #[error("{0}")]
    AlreadyMatched(String),

    /// Trip too full for the package (409).
    #[error("{0}")]
    CapacityExceeded(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_FAILED"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::InvalidState(_) => (StatusCode::BAD_REQUEST, "INVALID_STATE"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::AlreadyMatched(_) => (StatusCode::CONFLICT, "ALREADY_MATCHED"),
            Self::CapacityExceeded(_) => (StatusCode::CONFLICT, "CAPACITY_EXCEEDED"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => {
                tracing::error!(error = %self, "internal server error");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ApiResponse::failure(code, message))).into_response()
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        let message = err.to_string();
        match err {
            EngineError::NotFound { .. } => Self::NotFound(message),
            EngineError::Forbidden(_) => Self::Forbidden(message),
            EngineError::InvalidState(_) => Self::InvalidState(message),
            EngineError::AlreadyMatched(_) => Self::AlreadyMatched(message),
            EngineError::CapacityExceeded { .. } => Self::CapacityExceeded(message),
            EngineError::ValidationFailed(_) => Self::Validation(message),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}
