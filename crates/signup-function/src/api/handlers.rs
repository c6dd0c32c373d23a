//! HTTP request handlers.

use super::types::{HealthResponse, SignupRequest, SignupResponse, REGISTERED_MESSAGE};
use super::AppState;
use crate::directory::NewAccount;
use crate::error::SignupError;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use backend_client::UserMetadata;
use tracing::{debug, info, warn};

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        directory: state.directory.kind().to_string(),
        directory_healthy: state.directory.is_healthy().await,
    })
}

/// CORS preflight. The CORS layer adds the headers; the body stays empty.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Register a new user.
///
/// Checks for a username or phone number collision, synthesizes the
/// internal email and creates the auth record. The email is not part of
/// the response.
pub async fn register_user(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<Json<SignupResponse>, SignupError> {
    let Json(request) = payload.map_err(|e| SignupError::InvalidBody(e.body_text()))?;
    let request = normalize(request)?;
    info!(username = %request.username, "Signup request received");

    if let Some(field) = state
        .directory
        .find_conflict(&request.username, &request.phone_number)
        .await?
    {
        warn!(username = %request.username, %field, "Signup rejected: identity taken");
        return Err(SignupError::Duplicate(field));
    }

    let email = state.directory.generate_email(&request.username).await?;
    debug!("Internal email generated");

    let created = state
        .directory
        .create_account(NewAccount {
            email,
            password: request.password,
            metadata: UserMetadata {
                username: request.username.clone(),
                phone_number: request.phone_number,
                fund_password: request.fund_password,
                invitation_code: request.invitation_code,
            },
        })
        .await?;

    info!(username = %request.username, user_id = %created.user_id, "User registered");

    Ok(Json(SignupResponse {
        success: true,
        user_id: created.user_id,
        message: REGISTERED_MESSAGE.to_string(),
        email_confirmed: Some(created.email_confirmed),
    }))
}

/// Trim identifiers, drop a blank invitation code and reject missing fields.
fn normalize(request: SignupRequest) -> Result<SignupRequest, SignupError> {
    let username = request.username.trim().to_string();
    let phone_number = request.phone_number.trim().to_string();

    if username.is_empty()
        || phone_number.is_empty()
        || request.password.trim().is_empty()
        || request.fund_password.trim().is_empty()
    {
        return Err(SignupError::MissingFields);
    }

    Ok(SignupRequest {
        username,
        phone_number,
        password: request.password,
        fund_password: request.fund_password,
        invitation_code: request
            .invitation_code
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty()),
    })
}
