//! Common test utilities for integration tests.

use backend_client::BackendClient;
use portal_core::{AdminStatusCache, Portal};
use std::sync::Arc;
use std::time::Duration;
use wiremock::MockServer;

/// Start a mock backend server.
pub async fn mock_backend() -> MockServer {
    MockServer::start().await
}

/// Create a portal pointed at a mock backend.
pub fn test_portal(mock_server: &MockServer, deadline: Duration) -> Portal {
    let backend = BackendClient::new(mock_server.uri(), "anon-key", Duration::from_secs(10)).unwrap();
    Portal::new(
        Arc::new(backend),
        AdminStatusCache::new(Duration::from_secs(300)),
        deadline,
    )
}
