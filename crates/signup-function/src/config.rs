//! Configuration for the signup function.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// Signup function configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Hosted backend configuration
    #[serde(default)]
    pub backend: BackendConfig,

    /// Account directory selection
    #[serde(default)]
    pub directory: DirectoryConfig,

    /// Internal email synthesis
    #[serde(default)]
    pub email: EmailConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Backend base URL
    #[serde(default = "default_backend_url")]
    pub url: String,

    /// Service-role key used for auth-admin calls
    #[serde(default)]
    pub service_key: String,

    /// HTTP request timeout
    #[serde(default = "default_backend_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

/// Which account directory to run against.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DirectoryMode {
    /// The hosted backend
    #[default]
    Backend,
    /// Process memory (nothing persists across restarts)
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default)]
    pub mode: DirectoryMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Domain of synthesized addresses
    #[serde(default = "default_email_domain")]
    pub domain: String,

    /// Candidates tried before giving up
    #[serde(default = "default_email_attempts")]
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Global signup requests per minute
    #[serde(default = "default_global_rpm")]
    pub global_per_minute: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default implementations
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            service_key: String::new(),
            timeout: default_backend_timeout(),
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            domain: default_email_domain(),
            max_attempts: default_email_attempts(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            global_per_minute: default_global_rpm(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_listen_addr() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    8082
}

fn default_backend_url() -> String {
    "http://localhost:54321".into()
}

fn default_backend_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_email_domain() -> String {
    "vip.internal".into()
}

fn default_email_attempts() -> u32 {
    16
}

fn default_global_rpm() -> u32 {
    30
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
