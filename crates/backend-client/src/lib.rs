//! Client for the hosted backend behind the VIP portal.
//!
//! Covers the table reads (roles, profiles, commissions), the email
//! generator RPC, the auth-admin create-user call and the signup edge
//! function.

mod client;
mod error;
mod types;

pub use client::BackendClient;
pub use error::BackendError;
pub use types::*;
