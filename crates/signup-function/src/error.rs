//! Error types for the signup function.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use backend_client::IdentityField;
use serde::Serialize;
use thiserror::Error;

/// Signup function error types.
#[derive(Debug, Error)]
pub enum SignupError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("{0} already exists")]
    Duplicate(IdentityField),

    #[error("Failed to generate email: {0}")]
    EmailGeneration(String),

    /// Carries the auth backend's own message.
    #[error("{0}")]
    AuthCreation(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl SignupError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            SignupError::MissingFields => (StatusCode::BAD_REQUEST, "MISSING_FIELDS"),
            SignupError::InvalidBody(_) => (StatusCode::BAD_REQUEST, "INVALID_BODY"),
            SignupError::Duplicate(_) => (StatusCode::BAD_REQUEST, "DUPLICATE_IDENTITY"),
            SignupError::EmailGeneration(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "EMAIL_GENERATION_FAILED")
            }
            SignupError::AuthCreation(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "AUTH_CREATION_FAILED")
            }
            SignupError::Backend(_) => (StatusCode::INTERNAL_SERVER_ERROR, "BACKEND_ERROR"),
            SignupError::RateLimitExceeded => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMIT_EXCEEDED"),
            SignupError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for SignupError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
