//! Racing a future against a deadline.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinError;

/// Outcome of a future raced against a deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deadline<T> {
    /// The future settled before the deadline.
    Completed(T),
    /// The deadline fired first. Whatever the future produces later is discarded.
    TimedOut,
}

impl<T> Deadline<T> {
    pub fn is_timed_out(&self) -> bool {
        matches!(self, Deadline::TimedOut)
    }

    pub fn completed(self) -> Option<T> {
        match self {
            Deadline::Completed(value) => Some(value),
            Deadline::TimedOut => None,
        }
    }
}

/// Wait for `future` for at most `limit`.
///
/// The future is dropped if the deadline wins.
pub async fn with_deadline<F>(future: F, limit: Duration) -> Deadline<F::Output>
where
    F: Future,
{
    match tokio::time::timeout(limit, future).await {
        Ok(value) => Deadline::Completed(value),
        Err(_) => Deadline::TimedOut,
    }
}

/// Run `future` as a detached task and wait for it for at most `limit`.
///
/// Losing the race only stops the wait: the task keeps running to
/// completion and its result is dropped.
pub async fn detached_with_deadline<F>(
    future: F,
    limit: Duration,
) -> Deadline<Result<F::Output, JoinError>>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let handle = tokio::spawn(future);
    with_deadline(handle, limit).await
}
