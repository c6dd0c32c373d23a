//! Signup edge function for the VIP portal.
//!
//! Accepts a username, phone number, password, fund password and optional
//! invitation code, then in one request:
//! - rejects a username or phone number that is already registered
//! - synthesizes the internal email the auth backend requires
//! - creates the auth account with the profile details as metadata

pub mod api;
pub mod config;
pub mod directory;
pub mod email;
pub mod error;

pub use config::Config;
pub use directory::{AccountDirectory, HostedDirectory, MemoryDirectory};
pub use email::EmailSynthesizer;
pub use error::SignupError;
