// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction so time-dependent policy is testable.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Source of the current time.
///
/// `epoch_ms` drives every persisted timestamp; `now` drives interval
/// arithmetic (lock TTLs, breaker reset timeouts, rate-limiter refill).
pub trait Clock: Clone + Send + Sync + 'static {
    fn epoch_ms(&self) -> u64;
    fn now(&self) -> Instant;
}

/// Wall clock used by the daemon.
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-advanced clock for tests.
///
/// Starts at an arbitrary epoch (1_000_000 ms) so subtraction never
/// underflows in tests that look backwards in time.
#[cfg(any(test, feature = "test-support"))]
#[derive(Clone)]
pub struct ManualClock {
    inner: std::sync::Arc<parking_lot::Mutex<ManualClockState>>,
}

#[cfg(any(test, feature = "test-support"))]
struct ManualClockState {
    epoch_ms: u64,
    instant: Instant,
}

#[cfg(any(test, feature = "test-support"))]
impl ManualClock {
    pub fn new() -> Self {
        Self {
            inner: std::sync::Arc::new(parking_lot::Mutex::new(ManualClockState {
                epoch_ms: 1_000_000,
                instant: Instant::now(),
            })),
        }
    }

    /// Move both the epoch and the instant forward.
    pub fn advance(&self, by: Duration) {
        let mut state = self.inner.lock();
        state.epoch_ms += by.as_millis() as u64;
        state.instant += by;
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    pub fn set_epoch_ms(&self, epoch_ms: u64) {
        self.inner.lock().epoch_ms = epoch_ms;
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Clock for ManualClock {
    fn epoch_ms(&self) -> u64 {
        self.inner.lock().epoch_ms
    }

    fn now(&self) -> Instant {
        self.inner.lock().instant
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
