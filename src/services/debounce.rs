// src/services/debounce.rs
//
// Debouncer - runs an action once input has been quiet for a fixed delay
//
// CRITICAL RULES:
// - At most one pending action
// - A cancelled action never runs
// - Dropping the debouncer cancels the pending action

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm the timer with `action` unless one is already pending.
    /// Returns false when an earlier action is still waiting.
    pub fn start<F>(&self, action: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if pending.as_ref().is_some_and(|task| !task.is_finished()) {
            return false;
        }
        *pending = Some(self.spawn(action));
        true
    }

    /// Drop any pending action and restart the timer with `action`
    pub fn reset<F>(&self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = pending.take() {
            task.abort();
        }
        *pending = Some(self.spawn(action));
    }

    pub fn cancel(&self) {
        if let Some(task) = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
    }

    /// True while an action is waiting for its delay or still running
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    fn spawn<F>(&self, action: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        })
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
