//! In-memory account directory.

use super::{conflicting_field, AccountDirectory, CreatedAccount, NewAccount};
use crate::email::EmailSynthesizer;
use crate::error::SignupError;
use async_trait::async_trait;
use backend_client::{IdentityField, UserMetadata};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Stored account.
#[derive(Debug, Clone)]
pub struct AccountRecord {
    pub user_id: String,
    pub email: String,
    pub metadata: UserMetadata,
}

#[derive(Debug, Default)]
struct Accounts {
    /// Records indexed by user id
    by_id: HashMap<String, AccountRecord>,
    /// Emails that are already assigned
    emails: HashMap<String, String>,
}

/// Account directory kept in process memory, for local runs and tests.
///
/// Enforces username, phone number and email uniqueness itself, the way
/// the hosted backend's constraints would.
pub struct MemoryDirectory {
    accounts: RwLock<Accounts>,
    synthesizer: EmailSynthesizer,
}

impl MemoryDirectory {
    /// Create a new empty directory.
    pub fn new(synthesizer: EmailSynthesizer) -> Self {
        Self {
            accounts: RwLock::new(Accounts::default()),
            synthesizer,
        }
    }

    /// Get a record by user id.
    pub async fn get(&self, user_id: &str) -> Option<AccountRecord> {
        self.accounts.read().await.by_id.get(user_id).cloned()
    }

    /// Reserve an email so the synthesizer has to step past it.
    pub async fn reserve_email(&self, email: impl Into<String>) {
        let email = email.into();
        self.accounts
            .write()
            .await
            .emails
            .insert(email, String::new());
    }

    /// Get the number of accounts.
    pub async fn count(&self) -> usize {
        self.accounts.read().await.by_id.len()
    }
}

#[async_trait]
impl AccountDirectory for MemoryDirectory {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn find_conflict(
        &self,
        username: &str,
        phone_number: &str,
    ) -> Result<Option<IdentityField>, SignupError> {
        let accounts = self.accounts.read().await;
        Ok(conflicting_field(
            accounts.by_id.values().map(|r| {
                (
                    Some(r.metadata.username.as_str()),
                    Some(r.metadata.phone_number.as_str()),
                )
            }),
            username,
            phone_number,
        ))
    }

    async fn generate_email(&self, username: &str) -> Result<String, SignupError> {
        let accounts = self.accounts.read().await;
        self.synthesizer
            .generate(username, |candidate| accounts.emails.contains_key(candidate))
            .ok_or_else(|| {
                SignupError::EmailGeneration(format!(
                    "no free address after {} attempts",
                    self.synthesizer.max_attempts()
                ))
            })
    }

    async fn create_account(&self, account: NewAccount) -> Result<CreatedAccount, SignupError> {
        let mut accounts = self.accounts.write().await;

        // Re-check under the write lock; two signups may have passed the
        // duplicate check concurrently.
        if let Some(field) = conflicting_field(
            accounts.by_id.values().map(|r| {
                (
                    Some(r.metadata.username.as_str()),
                    Some(r.metadata.phone_number.as_str()),
                )
            }),
            &account.metadata.username,
            &account.metadata.phone_number,
        ) {
            return Err(SignupError::AuthCreation(format!(
                "{} already registered",
                field
            )));
        }
        if accounts.emails.contains_key(&account.email) {
            return Err(SignupError::AuthCreation(
                "A user with this email address has already been registered".into(),
            ));
        }

        let user_id = derive_user_id(&account.email);
        debug!(user_id = %user_id, "Storing account");

        accounts
            .emails
            .insert(account.email.clone(), user_id.clone());
        accounts.by_id.insert(
            user_id.clone(),
            AccountRecord {
                user_id: user_id.clone(),
                email: account.email,
                metadata: account.metadata,
            },
        );

        info!("In-memory directory now holds {} accounts", accounts.by_id.len());

        Ok(CreatedAccount {
            user_id,
            email_confirmed: true,
        })
    }

    async fn is_healthy(&self) -> bool {
        true
    }
}

fn derive_user_id(email: &str) -> String {
    let digest = Sha256::digest(email.as_bytes());
    hex::encode(&digest[..16])
}
