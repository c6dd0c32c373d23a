//! Per-key single-flight coordination.
//!
//! The first caller for a key gets an [`InFlightToken`] and does the work;
//! later callers get an [`InFlightWaiter`] that yields whatever the token
//! holder completes with.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

type Slots<T> = Arc<Mutex<HashMap<String, watch::Receiver<Option<T>>>>>;

/// Tracks which keys have an operation pending and shares its outcome.
///
/// Cloning shares the underlying slots, so every holder of a clone joins
/// the same in-flight operations.
#[derive(Debug)]
pub struct InFlightGuard<T> {
    slots: Slots<T>,
}

impl<T> Clone for InFlightGuard<T> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<T> Default for InFlightGuard<T> {
    fn default() -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<T: Clone> InFlightGuard<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key`, or join the operation that already holds it.
    ///
    /// The key is released when the returned token is dropped.
    pub fn try_acquire(&self, key: &str) -> Result<InFlightToken<T>, InFlightWaiter<T>> {
        let mut slots = lock(&self.slots);
        if let Some(outcome) = slots.get(key) {
            return Err(InFlightWaiter {
                outcome: outcome.clone(),
            });
        }

        let (tx, rx) = watch::channel(None);
        slots.insert(key.to_string(), rx);

        Ok(InFlightToken {
            key: key.to_string(),
            slots: Arc::clone(&self.slots),
            outcome: tx,
        })
    }

    pub fn is_in_flight(&self, key: &str) -> bool {
        lock(&self.slots).contains_key(key)
    }

    pub fn in_flight_count(&self) -> usize {
        lock(&self.slots).len()
    }
}

/// Proof of a claimed key; releases the key on drop.
#[derive(Debug)]
pub struct InFlightToken<T> {
    key: String,
    slots: Slots<T>,
    outcome: watch::Sender<Option<T>>,
}

impl<T> InFlightToken<T> {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Hand `value` to every waiter and release the key.
    pub fn complete(self, value: T) {
        self.outcome.send_replace(Some(value));
    }
}

impl<T> Drop for InFlightToken<T> {
    fn drop(&mut self) {
        lock(&self.slots).remove(&self.key);
    }
}

/// Handle on an operation someone else is running.
#[derive(Debug)]
pub struct InFlightWaiter<T> {
    outcome: watch::Receiver<Option<T>>,
}

impl<T: Clone> InFlightWaiter<T> {
    /// Wait for the token holder to finish.
    ///
    /// Returns `None` when the token was dropped without completing.
    pub async fn wait(mut self) -> Option<T> {
        loop {
            let current = self.outcome.borrow_and_update().clone();
            if current.is_some() {
                return current;
            }
            if self.outcome.changed().await.is_err() {
                return self.outcome.borrow().clone();
            }
        }
    }
}

fn lock<T>(
    slots: &Mutex<HashMap<String, watch::Receiver<Option<T>>>>,
) -> MutexGuard<'_, HashMap<String, watch::Receiver<Option<T>>>> {
    slots.lock().unwrap_or_else(PoisonError::into_inner)
}
