//! Process-wide admin status cache with a freshness window.

use crate::clock::{duration_millis, Clock, SystemClock};
use crate::error::PortalError;
use crate::guard::{InFlightGuard, InFlightToken, InFlightWaiter};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Default freshness window for cached admin status.
pub const DEFAULT_FRESHNESS_WINDOW: Duration = Duration::from_secs(5 * 60);

/// What a role lookup settled on, shared with callers that joined it.
pub type LookupOutcome = Result<bool, PortalError>;

/// Cached admin status for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminStatusEntry {
    pub user_id: String,
    pub is_admin: bool,
    pub observed_at_millis: i64,
}

/// Shared admin status cache.
///
/// Cloning is cheap and every clone sees the same entries and the same
/// in-flight lookups. Entries older than the freshness window are treated
/// as absent; writes for the same user replace each other (last writer
/// wins). Nothing is persisted.
#[derive(Clone)]
pub struct AdminStatusCache {
    entries: Arc<RwLock<HashMap<String, AdminStatusEntry>>>,
    in_flight: InFlightGuard<LookupOutcome>,
    clock: Arc<dyn Clock>,
    freshness_window: Duration,
}

impl AdminStatusCache {
    /// Create a cache using the system clock.
    pub fn new(freshness_window: Duration) -> Self {
        Self::with_clock(freshness_window, Arc::new(SystemClock))
    }

    /// Create a cache with an explicit clock.
    pub fn with_clock(freshness_window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            in_flight: InFlightGuard::new(),
            clock,
            freshness_window,
        }
    }

    pub fn freshness_window(&self) -> Duration {
        self.freshness_window
    }

    /// Get the entry for `user_id` if it is still fresh.
    #[instrument(skip(self))]
    pub async fn get_fresh(&self, user_id: &str) -> Option<AdminStatusEntry> {
        let entries = self.entries.read().await;
        let now = self.clock.now_millis();

        entries
            .get(user_id)
            .filter(|entry| self.is_fresh(entry, now))
            .cloned()
    }

    /// Record an observation for `user_id` stamped with the current time.
    #[instrument(skip(self))]
    pub async fn put(&self, user_id: &str, is_admin: bool) -> AdminStatusEntry {
        let entry = AdminStatusEntry {
            user_id: user_id.to_string(),
            is_admin,
            observed_at_millis: self.clock.now_millis(),
        };

        let mut entries = self.entries.write().await;
        entries.insert(user_id.to_string(), entry.clone());

        debug!("Cached admin status");
        entry
    }

    /// Drop the entry for `user_id`.
    pub async fn invalidate(&self, user_id: &str) -> bool {
        self.entries.write().await.remove(user_id).is_some()
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Remove stale entries, returning how many were dropped.
    pub async fn purge_stale(&self) -> usize {
        let mut entries = self.entries.write().await;
        let now = self.clock.now_millis();
        let before_count = entries.len();

        entries.retain(|_, entry| self.is_fresh(entry, now));

        let removed = before_count - entries.len();
        if removed > 0 {
            debug!("Purged {} stale admin status entries", removed);
        }
        removed
    }

    /// Number of fresh entries.
    pub async fn fresh_count(&self) -> usize {
        let entries = self.entries.read().await;
        let now = self.clock.now_millis();
        entries
            .values()
            .filter(|entry| self.is_fresh(entry, now))
            .count()
    }

    /// Claim the lookup slot for `user_id`, or join the lookup already
    /// pending for that user.
    pub fn begin_lookup(
        &self,
        user_id: &str,
    ) -> Result<InFlightToken<LookupOutcome>, InFlightWaiter<LookupOutcome>> {
        self.in_flight.try_acquire(user_id)
    }

    pub fn is_lookup_in_flight(&self, user_id: &str) -> bool {
        self.in_flight.is_in_flight(user_id)
    }

    fn is_fresh(&self, entry: &AdminStatusEntry, now: i64) -> bool {
        now.saturating_sub(entry.observed_at_millis) < duration_millis(self.freshness_window)
    }
}

impl Default for AdminStatusCache {
    fn default() -> Self {
        Self::new(DEFAULT_FRESHNESS_WINDOW)
    }
}
