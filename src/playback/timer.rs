//! Timers and cancellation
//!
//! Playback waits between frames through a [`Timer`] so tests can swap in
//! a virtual clock. Every wait can be cut short through a
//! [`CancellationToken`].

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Shared stop signal for a playback session
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    fn flag(&self) -> MutexGuard<'_, bool> {
        match self.inner.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Stop the session and wake any waiting timer
    pub fn cancel(&self) {
        *self.flag() = true;
        self.inner.1.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.flag()
    }

    /// Block until cancelled or `timeout` elapses. Returns true when
    /// cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut cancelled = self.flag();
        while !*cancelled {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            cancelled = match self.inner.1.wait_timeout(cancelled, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
        *cancelled
    }
}

/// Source of frame delays
pub trait Timer {
    /// Wait for `duration`. Returns false if the token was cancelled
    /// before or during the wait.
    fn sleep(&mut self, duration: Duration, token: &CancellationToken) -> bool;
}

/// Real wall-clock waits
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimer;

impl Timer for SystemTimer {
    fn sleep(&mut self, duration: Duration, token: &CancellationToken) -> bool {
        !token.wait_timeout(duration)
    }
}

/// Virtual clock that returns immediately and records every wait
#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    elapsed: Duration,
    sleeps: Vec<Duration>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total virtual time slept
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Each wait in order
    pub fn sleeps(&self) -> &[Duration] {
        &self.sleeps
    }
}

impl Timer for ManualTimer {
    fn sleep(&mut self, duration: Duration, token: &CancellationToken) -> bool {
        if token.is_cancelled() {
            return false;
        }
        self.elapsed += duration;
        self.sleeps.push(duration);
        true
    }
}

impl<T: Timer + ?Sized> Timer for &mut T {
    fn sleep(&mut self, duration: Duration, token: &CancellationToken) -> bool {
        (**self).sleep(duration, token)
    }
}
