//! Signup admission control and request logging.

use crate::error::SignupError;
use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::{num::NonZeroU32, sync::Arc, time::Instant};
use tracing::{debug, error, warn};

/// Quota applied when the configured limit is zero.
const FALLBACK_PER_MINUTE: NonZeroU32 = match NonZeroU32::new(30) {
    Some(n) => n,
    None => NonZeroU32::MIN,
};

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Process-wide signup quota.
///
/// Only signup attempts spend quota; `OPTIONS` requests always pass so a
/// burst of browser preflights cannot lock out real signups.
#[derive(Clone)]
pub struct RateLimitState {
    limiter: Arc<DirectLimiter>,
    per_minute: NonZeroU32,
}

impl RateLimitState {
    pub fn new(per_minute: u32) -> Self {
        let per_minute = NonZeroU32::new(per_minute).unwrap_or(FALLBACK_PER_MINUTE);
        Self {
            limiter: Arc::new(RateLimiter::direct(Quota::per_minute(per_minute))),
            per_minute,
        }
    }

    /// A quota high enough that tests never hit it.
    pub fn permissive() -> Self {
        Self::new(1000)
    }

    pub fn per_minute(&self) -> u32 {
        self.per_minute.get()
    }

    /// Whether a request with `method` may proceed, spending quota if so.
    pub fn admit(&self, method: &Method) -> bool {
        *method == Method::OPTIONS || self.limiter.check().is_ok()
    }
}

/// Reject signup attempts over the global quota with 429.
pub async fn rate_limit_middleware(
    State(quota): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Result<Response, SignupError> {
    if !quota.admit(request.method()) {
        warn!(per_minute = quota.per_minute(), "Signup quota exhausted");
        return Err(SignupError::RateLimitExceeded);
    }

    Ok(next.run(request).await)
}

/// Log each request once it has been answered.
///
/// Only the path is recorded; signup bodies carry passwords and are never
/// logged.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    if status.is_server_error() {
        error!(%method, %path, status = status.as_u16(), latency_ms, "Signup function error");
    } else if status.is_client_error() {
        warn!(%method, %path, status = status.as_u16(), latency_ms, "Request rejected");
    } else {
        debug!(%method, %path, status = status.as_u16(), latency_ms, "Request served");
    }

    response
}
