//! Self-registration flow.

use crate::error::PortalError;
use async_trait::async_trait;
use secrecy::SecretString;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

/// User-supplied signup details.
///
/// Passwords are kept as secrets and never appear in `Debug` output.
#[derive(Debug)]
pub struct RegistrationRequest {
    pub username: String,
    pub phone_number: String,
    pub password: SecretString,
    pub fund_password: SecretString,
    pub invitation_code: Option<String>,
}

impl RegistrationRequest {
    pub fn new(
        username: impl Into<String>,
        phone_number: impl Into<String>,
        password: impl Into<String>,
        fund_password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            phone_number: phone_number.into(),
            password: SecretString::new(password.into()),
            fund_password: SecretString::new(fund_password.into()),
            invitation_code: None,
        }
    }

    pub fn with_invitation_code(mut self, code: impl Into<String>) -> Self {
        let code = code.into();
        self.invitation_code = if code.trim().is_empty() {
            None
        } else {
            Some(code)
        };
        self
    }

    /// Check that every required field is present.
    pub fn validate(&self) -> Result<(), PortalError> {
        use secrecy::ExposeSecret;

        let required = [
            ("Username", self.username.as_str()),
            ("Phone number", self.phone_number.as_str()),
            ("Password", self.password.expose_secret().as_str()),
            ("Fund password", self.fund_password.expose_secret().as_str()),
        ];

        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((label, _)) => Err(PortalError::InvalidInput(format!("{} is required", label))),
            None => Ok(()),
        }
    }
}

/// Outcome of a successful registration.
///
/// Carries no email address: the internal address the backend generates is
/// never a login identifier for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationResult {
    pub success: bool,
    pub user_id: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_confirmed: Option<bool>,
}

/// Backend side of registration.
#[async_trait]
pub trait SignupGateway: Send + Sync {
    /// Perform the whole registration in one round trip.
    async fn sign_up(&self, request: &RegistrationRequest)
        -> Result<RegistrationResult, PortalError>;

    /// Only synthesize the internal email for `username`.
    async fn generate_email(&self, username: &str) -> Result<String, PortalError>;
}

/// Registration state as observed by the signup form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationState {
    Idle,
    Loading,
    Success(RegistrationResult),
    Error(String),
}

impl RegistrationState {
    pub fn is_loading(&self) -> bool {
        matches!(self, RegistrationState::Loading)
    }
}

/// Drives a signup form through `Idle → Loading → Success | Error`.
pub struct RegistrationFlow {
    gateway: Arc<dyn SignupGateway>,
    state: watch::Sender<RegistrationState>,
}

impl RegistrationFlow {
    pub fn new(gateway: Arc<dyn SignupGateway>) -> Self {
        let (state, _) = watch::channel(RegistrationState::Idle);
        Self { gateway, state }
    }

    pub fn state(&self) -> RegistrationState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RegistrationState> {
        self.state.subscribe()
    }

    /// Register a new user.
    ///
    /// Incomplete input is rejected before any backend call. Either the
    /// whole registration succeeds or exactly one error is returned.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register_user(
        &self,
        request: &RegistrationRequest,
    ) -> Result<RegistrationResult, PortalError> {
        self.state.send_replace(RegistrationState::Loading);

        let outcome = match request.validate() {
            Ok(()) => self.gateway.sign_up(request).await.and_then(|result| {
                if result.success {
                    Ok(result)
                } else {
                    Err(PortalError::AuthCreationFailed(result.message))
                }
            }),
            Err(err) => Err(err),
        };

        match &outcome {
            Ok(result) => {
                info!(user_id = %result.user_id, "Registration succeeded");
                self.state
                    .send_replace(RegistrationState::Success(result.clone()));
            }
            Err(err) => {
                warn!(error = %err, "Registration failed");
                self.state
                    .send_replace(RegistrationState::Error(err.user_message()));
            }
        }

        outcome
    }

    /// Ask the backend for the internal email it would assign to `username`.
    ///
    /// Does not touch the form state.
    #[instrument(skip(self))]
    pub async fn generate_email(&self, username: &str) -> Result<String, PortalError> {
        if username.trim().is_empty() {
            return Err(PortalError::InvalidInput("Username is required".into()));
        }
        self.gateway.generate_email(username).await
    }

    /// Return to `Idle`.
    pub fn reset(&self) {
        self.state.send_replace(RegistrationState::Idle);
    }
}
