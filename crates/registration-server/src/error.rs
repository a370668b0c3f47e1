//! Error types for the registration service.

use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use registration_store::{CpfError, RegistrationError};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Message returned to clients in place of storage details.
const STORAGE_FAILURE_MESSAGE: &str =
    "Registration could not be saved right now, please try again later";

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid CPF format: {0}")]
    InvalidFormat(String),

    #[error("Invalid CPF: verification digits do not match")]
    ChecksumMismatch,

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("CPF already registered: {0}")]
    DuplicateCpf(String),

    #[error("Registration not found: {0}")]
    NotFound(String),

    #[error("Registrations open on {0}")]
    RegistrationNotOpen(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl ApiError {
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        ApiError::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidFormat(_) => "INVALID_FORMAT",
            ApiError::ChecksumMismatch => "CHECKSUM_MISMATCH",
            ApiError::MalformedBody(_) => "MALFORMED_BODY",
            ApiError::InvalidField { .. } => "INVALID_FIELD",
            ApiError::DuplicateCpf(_) => "DUPLICATE_CPF",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::RegistrationNotOpen(_) => "REGISTRATION_NOT_OPEN",
            ApiError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ApiError::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidFormat(_)
            | ApiError::ChecksumMismatch
            | ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidField { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::DuplicateCpf(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RegistrationNotOpen(_) => StatusCode::FORBIDDEN,
            ApiError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ApiError::StorageUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::StorageUnavailable(detail) => {
                error!(detail = %detail, "Storage failure while handling request");
                STORAGE_FAILURE_MESSAGE.to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: message,
            code: self.code().to_string(),
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<CpfError> for ApiError {
    fn from(e: CpfError) -> Self {
        match e {
            CpfError::InvalidFormat(reason) => ApiError::InvalidFormat(reason),
            CpfError::ChecksumMismatch => ApiError::ChecksumMismatch,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedBody(rejection.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        ApiError::MalformedBody(rejection.body_text())
    }
}

impl From<RegistrationError> for ApiError {
    fn from(e: RegistrationError) -> Self {
        match e {
            RegistrationError::InvalidCpf(e) => e.into(),
            RegistrationError::DuplicateCpf(cpf) => ApiError::DuplicateCpf(cpf),
            RegistrationError::StorageUnavailable(msg) => ApiError::StorageUnavailable(msg),
            RegistrationError::Serialization(e) => ApiError::StorageUnavailable(e.to_string()),
        }
    }
}
