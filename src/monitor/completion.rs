//! # Completion Signal
//!
//! A one-shot, broadcast-once notification. Any number of clones can observe
//! the single false → true transition: the entry shell blocks on it, the
//! interaction loop probes it without blocking, and `stop()` waits on it with
//! a deadline.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

#[derive(Clone, Default)]
pub struct Completion {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    fired: Mutex<bool>,
    cond: Condvar,
}

impl Completion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch the signal and wake every waiter.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn fire(&self) -> bool {
        let mut fired = self.inner.fired.lock().unwrap_or_else(PoisonError::into_inner);
        if *fired {
            return false;
        }
        *fired = true;
        self.inner.cond.notify_all();
        true
    }

    /// Non-blocking probe.
    pub fn is_fired(&self) -> bool {
        *self.inner.fired.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until the signal fires.
    pub fn wait(&self) {
        let mut fired = self.inner.fired.lock().unwrap_or_else(PoisonError::into_inner);
        while !*fired {
            fired = self
                .inner
                .cond
                .wait(fired)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Block until the signal fires or `timeout` elapses.
    ///
    /// Returns whether the signal had fired when the call returned.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut fired = self.inner.fired.lock().unwrap_or_else(PoisonError::into_inner);
        while !*fired {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _) = self
                .inner
                .cond
                .wait_timeout(fired, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            fired = guard;
        }
        true
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("fired", &self.is_fired())
            .finish()
    }
}
