//! API request and response types.

use serde::Serialize;

pub use backend_client::{SignupRequest, SignupResponse};

/// Message returned on successful registration.
pub const REGISTERED_MESSAGE: &str = "User registered successfully";

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub directory: String,
    pub directory_healthy: bool,
}
