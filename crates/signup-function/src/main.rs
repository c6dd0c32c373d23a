//! Signup function - Entry point.

use backend_client::BackendClient;
use signup_function::{
    api::{create_router_with_rate_limit, AppState, RateLimitState},
    config::{Config, DirectoryMode},
    AccountDirectory, EmailSynthesizer, HostedDirectory, MemoryDirectory,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting signup function");

    // Initialize account directory
    let directory: Arc<dyn AccountDirectory> = match config.directory.mode {
        DirectoryMode::Backend => {
            if config.backend.service_key.is_empty() {
                warn!("BACKEND__SERVICE_KEY is empty; auth-admin calls will be rejected");
            }
            let client = match BackendClient::new(
                &config.backend.url,
                &config.backend.service_key,
                config.backend.timeout,
            ) {
                Ok(c) => c,
                Err(e) => {
                    error!("Failed to create backend client: {}", e);
                    std::process::exit(1);
                }
            };
            info!("Using hosted backend at {}", config.backend.url);
            Arc::new(HostedDirectory::new(client))
        }
        DirectoryMode::Memory => {
            info!("Using in-memory account directory");
            Arc::new(MemoryDirectory::new(EmailSynthesizer::new(
                config.email.domain.clone(),
                config.email.max_attempts,
            )))
        }
    };

    if !directory.is_healthy().await {
        warn!("Account directory health check failed - will retry on requests");
    }

    // Create application state
    let state = AppState::new(directory);

    // Create rate limiter from config
    let rate_limit = RateLimitState::new(config.rate_limit.global_per_minute);

    // Create router with rate limiting
    let app = create_router_with_rate_limit(state, rate_limit);

    // Bind to address
    let addr = SocketAddr::new(
        config
            .server
            .listen_addr
            .parse()
            .unwrap_or([0, 0, 0, 0].into()),
        config.server.port,
    );

    info!("Listening on {}", addr);

    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
