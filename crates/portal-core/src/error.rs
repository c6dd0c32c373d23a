//! Portal error types.

use backend_client::IdentityField;
use thiserror::Error;

/// Errors surfaced to the portal UI.
///
/// Every backend failure is converted into one of these at the boundary;
/// [`PortalError::user_message`] gives the text to show the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortalError {
    #[error("Request timed out")]
    Timeout,

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("{field} already exists")]
    DuplicateIdentity { field: IdentityField },

    #[error("Email generation failed: {0}")]
    EmailGenerationFailed(String),

    #[error("Account creation failed: {0}")]
    AuthCreationFailed(String),

    #[error("Not signed in")]
    Unauthenticated,

    #[error("Administrator role required")]
    Forbidden,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl PortalError {
    /// Message suitable for display in the UI.
    pub fn user_message(&self) -> String {
        match self {
            PortalError::Timeout => {
                "The server took too long to respond. Please try again.".to_string()
            }
            PortalError::BackendUnavailable(_) => {
                "Unable to reach the server. Please check your connection.".to_string()
            }
            PortalError::DuplicateIdentity { field } => field.duplicate_message(),
            PortalError::EmailGenerationFailed(_) => {
                "Could not prepare your account. Please try again later.".to_string()
            }
            PortalError::AuthCreationFailed(message) => message.clone(),
            PortalError::Unauthenticated => "Please sign in first.".to_string(),
            PortalError::Forbidden => "You do not have access to this page.".to_string(),
            PortalError::InvalidInput(message) => message.clone(),
        }
    }
}

/// Result type alias for portal operations.
pub type PortalResult<T> = Result<T, PortalError>;
