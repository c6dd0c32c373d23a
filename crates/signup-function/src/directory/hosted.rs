//! Directory backed by the hosted backend.

use super::{conflicting_field, AccountDirectory, CreatedAccount, NewAccount};
use crate::error::SignupError;
use async_trait::async_trait;
use backend_client::{BackendClient, BackendError, IdentityField, NewAuthUser};
use tracing::{instrument, warn};

/// Directory that talks to the hosted backend with the service key.
#[derive(Clone)]
pub struct HostedDirectory {
    client: BackendClient,
}

impl HostedDirectory {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AccountDirectory for HostedDirectory {
    fn kind(&self) -> &'static str {
        "backend"
    }

    #[instrument(skip(self))]
    async fn find_conflict(
        &self,
        username: &str,
        phone_number: &str,
    ) -> Result<Option<IdentityField>, SignupError> {
        let rows = self
            .client
            .find_profiles(username, phone_number)
            .await
            .map_err(|e| SignupError::Backend(e.to_string()))?;

        Ok(conflicting_field(
            rows.iter()
                .map(|r| (r.username.as_deref(), r.phone_number.as_deref())),
            username,
            phone_number,
        ))
    }

    #[instrument(skip(self))]
    async fn generate_email(&self, username: &str) -> Result<String, SignupError> {
        let email = self
            .client
            .generate_unique_email(username)
            .await
            .map_err(|e| SignupError::EmailGeneration(e.to_string()))?;

        if email.trim().is_empty() {
            return Err(SignupError::EmailGeneration(
                "generator returned an empty address".into(),
            ));
        }
        Ok(email)
    }

    #[instrument(skip(self, account), fields(username = %account.metadata.username))]
    async fn create_account(&self, account: NewAccount) -> Result<CreatedAccount, SignupError> {
        let user = NewAuthUser {
            email: account.email,
            password: account.password,
            email_confirm: true,
            user_metadata: account.metadata,
        };

        let created = self.client.create_user(&user).await.map_err(|e| {
            warn!(error = %e, "Auth user creation failed");
            SignupError::AuthCreation(auth_error_message(e))
        })?;

        Ok(CreatedAccount {
            user_id: created.id,
            email_confirmed: created.email_confirmed_at.is_some(),
        })
    }

    async fn is_healthy(&self) -> bool {
        self.client.health_check().await
    }
}

/// Pull the human-readable message out of an auth API error.
fn auth_error_message(err: BackendError) -> String {
    match err {
        BackendError::Api { message, .. } => serde_json::from_str::<serde_json::Value>(&message)
            .ok()
            .and_then(|body| {
                ["msg", "message", "error_description", "error"]
                    .iter()
                    .find_map(|key| body.get(*key).and_then(|v| v.as_str()).map(String::from))
            })
            .unwrap_or(message),
        other => other.to_string(),
    }
}
