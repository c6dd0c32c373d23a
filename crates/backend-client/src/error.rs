//! Backend client errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Authentication failed")]
    Unauthorized,

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// An edge function answered with a non-success status and an `{error}` body.
    #[error("Function error: {status} - {message}")]
    Function {
        status: u16,
        code: Option<String>,
        message: String,
    },
}

impl BackendError {
    /// True when the underlying HTTP request hit the client timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, BackendError::Http(e) if e.is_timeout())
    }
}
