//! Admin status resolution.

use crate::cache::{AdminStatusCache, LookupOutcome};
use crate::deadline::{detached_with_deadline, Deadline};
use crate::error::PortalError;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Default deadline for a backend role lookup.
pub const DEFAULT_LOOKUP_DEADLINE: Duration = Duration::from_secs(5);

/// Backend query deciding whether a user holds the admin role.
#[async_trait]
pub trait RoleLookup: Send + Sync + 'static {
    /// `Ok(true)` when a role row exists for the user.
    async fn has_admin_role(&self, user_id: &str) -> Result<bool, PortalError>;
}

/// Admin status as observed by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminStatus {
    Unchecked,
    Checking,
    Resolved { is_admin: bool },
    Failed(PortalError),
}

impl AdminStatus {
    /// Only a resolved positive check grants admin access.
    pub fn is_admin(&self) -> bool {
        matches!(self, AdminStatus::Resolved { is_admin: true })
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, AdminStatus::Checking)
    }

    pub fn error(&self) -> Option<&PortalError> {
        match self {
            AdminStatus::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Authentication state change fed to the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn { user_id: String },
    SignedOut,
}

#[derive(Debug, Default)]
struct Session {
    user_id: Option<String>,
    /// Bumped whenever the signed-in user changes; results computed for an
    /// older generation are not published.
    generation: u64,
}

/// Resolves and publishes whether the signed-in user is an administrator.
///
/// Resolvers built on clones of the same [`AdminStatusCache`] share cached
/// results and in-flight lookups, so concurrent resolutions for one user
/// issue a single backend call and all settle on its outcome.
pub struct AdminStatusResolver {
    lookup: Arc<dyn RoleLookup>,
    cache: AdminStatusCache,
    deadline: Duration,
    session: Mutex<Session>,
    status: watch::Sender<AdminStatus>,
}

impl AdminStatusResolver {
    pub fn new(lookup: Arc<dyn RoleLookup>, cache: AdminStatusCache) -> Self {
        Self::with_deadline(lookup, cache, DEFAULT_LOOKUP_DEADLINE)
    }

    pub fn with_deadline(
        lookup: Arc<dyn RoleLookup>,
        cache: AdminStatusCache,
        deadline: Duration,
    ) -> Self {
        let (status, _) = watch::channel(AdminStatus::Unchecked);
        Self {
            lookup,
            cache,
            deadline,
            session: Mutex::new(Session::default()),
            status,
        }
    }

    /// Current status snapshot.
    pub fn status(&self) -> AdminStatus {
        self.status.borrow().clone()
    }

    /// Subscribe to status changes.
    pub fn subscribe(&self) -> watch::Receiver<AdminStatus> {
        self.status.subscribe()
    }

    pub fn is_admin(&self) -> bool {
        self.status.borrow().is_admin()
    }

    pub fn is_loading(&self) -> bool {
        self.status.borrow().is_loading()
    }

    pub fn error(&self) -> Option<PortalError> {
        self.status.borrow().error().cloned()
    }

    pub fn current_user(&self) -> Option<String> {
        self.session().user_id.clone()
    }

    /// Resolve admin status for `user_id`.
    ///
    /// A fresh cache entry answers immediately unless `force_check` is set.
    /// While a lookup for the same user is pending elsewhere this call joins
    /// it instead of issuing another backend request, and publishes its
    /// outcome.
    #[instrument(skip(self))]
    pub async fn resolve(&self, user_id: Option<&str>, force_check: bool) -> AdminStatus {
        let Some(user_id) = user_id else {
            self.sign_out();
            return self.status();
        };

        let generation = self.adopt_user(user_id);

        if !force_check {
            if let Some(entry) = self.cache.get_fresh(user_id).await {
                debug!(is_admin = entry.is_admin, "Admin status served from cache");
                let status = AdminStatus::Resolved {
                    is_admin: entry.is_admin,
                };
                self.publish(generation, status.clone());
                return status;
            }
        }

        loop {
            match self.cache.begin_lookup(user_id) {
                Ok(token) => {
                    self.publish(generation, AdminStatus::Checking);
                    let outcome = self.run_lookup(user_id).await;
                    token.complete(outcome.clone());
                    return self.settle(generation, outcome);
                }
                Err(waiter) => {
                    debug!("Admin check already in flight, joining it");
                    self.publish(generation, AdminStatus::Checking);
                    if let Some(outcome) = waiter.wait().await {
                        return self.settle(generation, outcome);
                    }
                    debug!("Joined admin check was abandoned, retrying");
                }
            }
        }
    }

    async fn run_lookup(&self, user_id: &str) -> LookupOutcome {
        let lookup = Arc::clone(&self.lookup);
        let owned_user_id = user_id.to_string();
        let outcome = detached_with_deadline(
            async move { lookup.has_admin_role(&owned_user_id).await },
            self.deadline,
        )
        .await;

        match outcome {
            Deadline::Completed(Ok(Ok(is_admin))) => {
                self.cache.put(user_id, is_admin).await;
                info!(is_admin, "Admin status resolved");
                Ok(is_admin)
            }
            Deadline::Completed(Ok(Err(err))) => {
                warn!(error = %err, "Admin check failed");
                Err(err)
            }
            Deadline::Completed(Err(join_err)) => {
                warn!(error = %join_err, "Admin check task failed");
                Err(PortalError::BackendUnavailable(join_err.to_string()))
            }
            Deadline::TimedOut => {
                warn!(deadline = ?self.deadline, "Admin check timed out");
                Err(PortalError::Timeout)
            }
        }
    }

    fn settle(&self, generation: u64, outcome: LookupOutcome) -> AdminStatus {
        let status = match outcome {
            Ok(is_admin) => AdminStatus::Resolved { is_admin },
            Err(err) => AdminStatus::Failed(err),
        };
        self.publish(generation, status.clone());
        status
    }

    /// Re-check the current user, bypassing the cache.
    pub async fn refresh(&self) -> AdminStatus {
        let user_id = self.current_user();
        self.resolve(user_id.as_deref(), true).await
    }

    /// React to a login or logout.
    ///
    /// Logout publishes "not admin" immediately; a lookup still pending for
    /// the previous user is ignored when it settles.
    pub async fn handle_auth_event(&self, event: AuthEvent) -> AdminStatus {
        match event {
            AuthEvent::SignedIn { user_id } => self.resolve(Some(&user_id), false).await,
            AuthEvent::SignedOut => {
                self.sign_out();
                self.status()
            }
        }
    }

    /// Gate for admin-only surfaces.
    pub fn require_admin(&self) -> Result<(), PortalError> {
        if self.current_user().is_none() {
            return Err(PortalError::Unauthenticated);
        }

        if self.is_admin() {
            Ok(())
        } else {
            Err(PortalError::Forbidden)
        }
    }

    fn sign_out(&self) {
        let mut session = self.session();
        if session.user_id.take().is_some() {
            info!("Signed out, clearing admin status");
        }
        session.generation += 1;
        self.status
            .send_replace(AdminStatus::Resolved { is_admin: false });
    }

    fn adopt_user(&self, user_id: &str) -> u64 {
        let mut session = self.session();
        if session.user_id.as_deref() != Some(user_id) {
            session.user_id = Some(user_id.to_string());
            session.generation += 1;
        }
        session.generation
    }

    fn publish(&self, generation: u64, status: AdminStatus) {
        let session = self.session();
        if session.generation == generation {
            self.status.send_replace(status);
        } else {
            debug!("Discarding admin status for a previous session");
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
