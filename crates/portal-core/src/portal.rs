//! Wiring of the portal components around one backend client.

use crate::cache::AdminStatusCache;
use crate::commission::CommissionSummary;
use crate::config::PortalConfig;
use crate::error::PortalError;
use crate::registration::RegistrationFlow;
use crate::resolver::AdminStatusResolver;
use backend_client::BackendClient;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

/// Owns the backend client and the shared admin status cache.
///
/// Every resolver handed out shares the same cache, so admin checks from
/// different parts of the UI deduplicate against each other.
#[derive(Clone)]
pub struct Portal {
    backend: Arc<BackendClient>,
    admin_cache: AdminStatusCache,
    lookup_deadline: Duration,
}

impl Portal {
    pub fn new(
        backend: Arc<BackendClient>,
        admin_cache: AdminStatusCache,
        lookup_deadline: Duration,
    ) -> Self {
        Self {
            backend,
            admin_cache,
            lookup_deadline,
        }
    }

    /// Build a portal from configuration.
    pub fn from_config(config: &PortalConfig) -> Result<Self, PortalError> {
        let backend = BackendClient::new(
            &config.backend.url,
            &config.backend.anon_key,
            config.backend.timeout,
        )
        .map_err(|e| PortalError::BackendUnavailable(e.to_string()))?;

        info!(
            backend = %config.backend.url,
            freshness_window = ?config.admin.freshness_window,
            deadline = ?config.admin.deadline,
            "Portal configured"
        );

        Ok(Self::new(
            Arc::new(backend),
            AdminStatusCache::new(config.admin.freshness_window),
            config.admin.deadline,
        ))
    }

    pub fn backend(&self) -> &BackendClient {
        &self.backend
    }

    pub fn admin_cache(&self) -> &AdminStatusCache {
        &self.admin_cache
    }

    /// A new resolver attached to the shared cache.
    pub fn admin_resolver(&self) -> AdminStatusResolver {
        AdminStatusResolver::with_deadline(
            self.backend.clone(),
            self.admin_cache.clone(),
            self.lookup_deadline,
        )
    }

    /// A new signup form flow.
    pub fn registration_flow(&self) -> RegistrationFlow {
        RegistrationFlow::new(self.backend.clone())
    }

    /// Commission totals for `user_id` relative to `now`.
    #[instrument(skip(self))]
    pub async fn commission_summary(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<CommissionSummary, PortalError> {
        let records = self
            .backend
            .list_commissions(user_id)
            .await
            .map_err(|e| PortalError::BackendUnavailable(e.to_string()))?;

        Ok(CommissionSummary::from_records(&records, now))
    }
}
