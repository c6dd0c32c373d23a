//! Hosted-backend implementations of the portal seams.

use crate::error::PortalError;
use crate::registration::{RegistrationRequest, RegistrationResult, SignupGateway};
use crate::resolver::RoleLookup;
use async_trait::async_trait;
use backend_client::{BackendClient, BackendError, IdentityField, SignupRequest};
use secrecy::ExposeSecret;

/// Error codes emitted by the signup function.
const CODE_EMAIL_GENERATION_FAILED: &str = "EMAIL_GENERATION_FAILED";
const CODE_AUTH_CREATION_FAILED: &str = "AUTH_CREATION_FAILED";
const CODE_BACKEND_ERROR: &str = "BACKEND_ERROR";
const CODE_INTERNAL_ERROR: &str = "INTERNAL_ERROR";

#[async_trait]
impl RoleLookup for BackendClient {
    async fn has_admin_role(&self, user_id: &str) -> Result<bool, PortalError> {
        self.find_admin_role(user_id)
            .await
            .map(|row| row.is_some())
            .map_err(connectivity_error)
    }
}

#[async_trait]
impl SignupGateway for BackendClient {
    async fn sign_up(
        &self,
        request: &RegistrationRequest,
    ) -> Result<RegistrationResult, PortalError> {
        let body = SignupRequest {
            username: request.username.trim().to_string(),
            phone_number: request.phone_number.trim().to_string(),
            password: request.password.expose_secret().clone(),
            fund_password: request.fund_password.expose_secret().clone(),
            invitation_code: request.invitation_code.clone(),
        };

        let response = self.invoke_signup(&body).await.map_err(signup_error)?;

        Ok(RegistrationResult {
            success: response.success,
            user_id: response.user_id,
            message: response.message,
            email_confirmed: response.email_confirmed,
        })
    }

    async fn generate_email(&self, username: &str) -> Result<String, PortalError> {
        self.generate_unique_email(username.trim())
            .await
            .map_err(|e| PortalError::EmailGenerationFailed(e.to_string()))
    }
}

/// Map a transport-level failure to the portal taxonomy.
fn connectivity_error(err: BackendError) -> PortalError {
    if err.is_timeout() {
        PortalError::Timeout
    } else {
        PortalError::BackendUnavailable(err.to_string())
    }
}

/// Map a signup function failure to the portal taxonomy.
fn signup_error(err: BackendError) -> PortalError {
    match err {
        BackendError::Function {
            status,
            code,
            message,
        } => {
            if let Some(field) = IdentityField::from_duplicate_message(&message) {
                return PortalError::DuplicateIdentity { field };
            }
            match code.as_deref() {
                Some(CODE_EMAIL_GENERATION_FAILED) => PortalError::EmailGenerationFailed(message),
                Some(CODE_AUTH_CREATION_FAILED) => PortalError::AuthCreationFailed(message),
                Some(CODE_BACKEND_ERROR | CODE_INTERNAL_ERROR) => {
                    PortalError::BackendUnavailable(message)
                }
                _ if (400..500).contains(&status) => PortalError::InvalidInput(message),
                _ if status >= 500 => PortalError::BackendUnavailable(message),
                _ => PortalError::AuthCreationFailed(message),
            }
        }
        other => connectivity_error(other),
    }
}
