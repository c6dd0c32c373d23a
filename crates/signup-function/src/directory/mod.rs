//! Account directory: where identities are checked and created.

mod hosted;
mod memory;

pub use hosted::HostedDirectory;
pub use memory::MemoryDirectory;

use crate::error::SignupError;
use async_trait::async_trait;
use backend_client::{IdentityField, UserMetadata};
use std::fmt;

/// Account to be created.
#[derive(Clone)]
pub struct NewAccount {
    /// Internal email; never returned to the caller.
    pub email: String,
    pub password: String,
    pub metadata: UserMetadata,
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// Account as created by the auth backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedAccount {
    pub user_id: String,
    pub email_confirmed: bool,
}

/// Identity store the signup function runs against.
///
/// The backend's own uniqueness constraints remain the source of truth;
/// [`AccountDirectory::find_conflict`] is checked first only to return a
/// precise error.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Short name for health reporting.
    fn kind(&self) -> &'static str;

    /// The first identity field already taken, checking username before
    /// phone number.
    async fn find_conflict(
        &self,
        username: &str,
        phone_number: &str,
    ) -> Result<Option<IdentityField>, SignupError>;

    /// An unused internal email for `username`.
    async fn generate_email(&self, username: &str) -> Result<String, SignupError>;

    /// Create the auth record.
    async fn create_account(&self, account: NewAccount) -> Result<CreatedAccount, SignupError>;

    async fn is_healthy(&self) -> bool;
}

/// Pick the colliding field from matched identities, username first.
pub(crate) fn conflicting_field<'a>(
    matches: impl IntoIterator<Item = (Option<&'a str>, Option<&'a str>)> + Clone,
    username: &str,
    phone_number: &str,
) -> Option<IdentityField> {
    if matches.clone().into_iter().any(|(u, _)| u == Some(username)) {
        Some(IdentityField::Username)
    } else if matches.into_iter().any(|(_, p)| p == Some(phone_number)) {
        Some(IdentityField::PhoneNumber)
    } else {
        None
    }
}
