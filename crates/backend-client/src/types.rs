//! Backend wire types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role value that marks an administrator in the `user_roles` table.
pub const ADMIN_ROLE: &str = "admin";

/// Row of the `user_roles` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleRow {
    pub user_id: String,
    pub role: String,
}

/// Identity columns of the `profiles` table used for duplicate detection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileRow {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Row of the `commissions` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommissionRow {
    pub order_id: String,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Profile metadata attached to a newly created auth user.
#[derive(Clone, Serialize, Deserialize)]
pub struct UserMetadata {
    pub username: String,
    pub phone_number: String,
    pub fund_password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invitation_code: Option<String>,
}

impl fmt::Debug for UserMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserMetadata")
            .field("username", &self.username)
            .field("phone_number", &self.phone_number)
            .field("fund_password", &"[REDACTED]")
            .field("invitation_code", &self.invitation_code)
            .finish()
    }
}

/// Body of the auth-admin create-user call.
#[derive(Clone, Serialize)]
pub struct NewAuthUser {
    pub email: String,
    pub password: String,
    pub email_confirm: bool,
    pub user_metadata: UserMetadata,
}

impl fmt::Debug for NewAuthUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAuthUser")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("email_confirm", &self.email_confirm)
            .field("user_metadata", &self.user_metadata)
            .finish()
    }
}

/// Auth user returned by the create-user call.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
}

/// Request body of the signup edge function.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub fund_password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invitation_code: Option<String>,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("username", &self.username)
            .field("phone_number", &self.phone_number)
            .field("password", &"[REDACTED]")
            .field("fund_password", &"[REDACTED]")
            .field("invitation_code", &self.invitation_code)
            .finish()
    }
}

/// Success body of the signup edge function.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignupResponse {
    pub success: bool,
    pub user_id: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_confirmed: Option<bool>,
}

/// Error body returned by edge functions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Identity attribute that collided during signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityField {
    Username,
    PhoneNumber,
}

impl IdentityField {
    /// Human-readable field name as used in duplicate messages.
    pub fn label(self) -> &'static str {
        match self {
            IdentityField::Username => "Username",
            IdentityField::PhoneNumber => "Phone number",
        }
    }

    /// Message returned by the signup function for a collision on this field.
    pub fn duplicate_message(self) -> String {
        format!("{} already exists", self.label())
    }

    /// Parse a `"<Field> already exists"` message.
    pub fn from_duplicate_message(message: &str) -> Option<Self> {
        match message.trim().strip_suffix(" already exists")? {
            "Username" => Some(IdentityField::Username),
            "Phone number" => Some(IdentityField::PhoneNumber),
            _ => None,
        }
    }
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
