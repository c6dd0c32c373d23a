//! Portal configuration loaded from environment variables.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// Portal configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortalConfig {
    /// Hosted backend configuration
    #[serde(default)]
    pub backend: BackendConfig,

    /// Admin status resolution
    #[serde(default)]
    pub admin: AdminConfig,

    /// Logging configuration, read by the embedding application when it
    /// installs its subscriber. The library never installs one itself.
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Backend base URL
    #[serde(default = "default_backend_url")]
    pub url: String,

    /// Public (anon) API key
    #[serde(default)]
    pub anon_key: String,

    /// HTTP request timeout
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// How long a cached admin status stays valid
    #[serde(default = "default_freshness_window", with = "humantime_serde")]
    pub freshness_window: Duration,

    /// Deadline for a single role lookup
    #[serde(default = "default_lookup_deadline", with = "humantime_serde")]
    pub deadline: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Default filter directive for the embedding application's
    /// `tracing_subscriber::EnvFilter`, used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            anon_key: String::new(),
            timeout: default_request_timeout(),
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            freshness_window: default_freshness_window(),
            deadline: default_lookup_deadline(),
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

fn default_backend_url() -> String {
    "http://localhost:54321".into()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_freshness_window() -> Duration {
    crate::cache::DEFAULT_FRESHNESS_WINDOW
}

fn default_lookup_deadline() -> Duration {
    crate::resolver::DEFAULT_LOOKUP_DEADLINE
}

fn default_log_level() -> String {
    "info".into()
}

impl PortalConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("PORTAL")
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
