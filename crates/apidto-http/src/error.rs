//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps [`DtoError`] to HTTP status codes and a JSON error body with a
//! machine-readable code and a message. Internal error details are logged
//! and never returned to the client.

use apidto_core::DtoError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// The error.
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "BAD_REQUEST", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-facing error for DTO extraction and rendering.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request or its body could not be read as JSON (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The body was JSON but did not fit the DTO schema (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Server-side failure (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => {
                tracing::error!(error = %self, "internal server error");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<DtoError> for ApiError {
    fn from(err: DtoError) -> Self {
        match &err {
            DtoError::MalformedInput(_) | DtoError::InvalidRequest(_) => {
                Self::BadRequest(err.to_string())
            }
            DtoError::TypeMismatch { .. }
            | DtoError::EnumCoercion { .. }
            | DtoError::MissingField { .. }
            | DtoError::UnknownField { .. } => Self::Validation(err.to_string()),
            DtoError::SensitiveField(_)
            | DtoError::UnsupportedType { .. }
            | DtoError::DuplicateField { .. }
            | DtoError::Encode(_) => Self::Internal(err.to_string()),
        }
    }
}
