// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared token-bucket rate limiter with a Retry-After penalty floor.

use fm_core::Clock;
use parking_lot::Mutex;
use std::time::{Duration, Instant};

struct BucketState {
    tokens: f64,
    last_refill: Instant,
    /// No acquisition succeeds before this instant (Retry-After floor).
    penalty_until: Option<Instant>,
}

/// Token bucket shared by every upstream caller in the process.
pub struct RateLimiter<C: Clock> {
    clock: C,
    capacity: f64,
    refill_per_second: f64,
    state: Mutex<BucketState>,
}

impl<C: Clock> RateLimiter<C> {
    pub fn new(clock: C, capacity: f64, refill_per_second: f64) -> Self {
        let now = clock.now();
        Self {
            clock,
            capacity: capacity.max(1.0),
            refill_per_second: refill_per_second.max(f64::MIN_POSITIVE),
            state: Mutex::new(BucketState {
                tokens: capacity.max(1.0),
                last_refill: now,
                penalty_until: None,
            }),
        }
    }

    fn refill(&self, state: &mut BucketState, now: Instant) {
        let elapsed = now.saturating_duration_since(state.last_refill);
        state.tokens =
            (state.tokens + elapsed.as_secs_f64() * self.refill_per_second).min(self.capacity);
        state.last_refill = now;
    }

    /// Take one token without waiting. Returns false when empty or inside
    /// a penalty window.
    pub fn try_acquire(&self) -> bool {
        let now = self.clock.now();
        let mut state = self.state.lock();
        if let Some(until) = state.penalty_until {
            if now < until {
                return false;
            }
            state.penalty_until = None;
        }
        self.refill(&mut state, now);
        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// How long until a token could be available. Zero when one is ready.
    pub fn time_to_ready(&self) -> Duration {
        let now = self.clock.now();
        let mut state = self.state.lock();
        let penalty_wait = state
            .penalty_until
            .map(|until| until.saturating_duration_since(now))
            .unwrap_or(Duration::ZERO);
        self.refill(&mut state, now);
        let refill_wait = if state.tokens >= 1.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64((1.0 - state.tokens) / self.refill_per_second)
        };
        penalty_wait.max(refill_wait)
    }

    /// Suspend until one token is taken.
    pub async fn acquire(&self) {
        loop {
            if self.try_acquire() {
                return;
            }
            let wait = self.time_to_ready().max(Duration::from_millis(10));
            tokio::time::sleep(wait).await;
        }
    }

    /// Push the delay floor out to `now + seconds` (Retry-After). A
    /// shorter penalty never shrinks an existing one.
    pub fn penalize(&self, seconds: f64) {
        let until = self.clock.now() + Duration::from_secs_f64(seconds.max(0.0));
        let mut state = self.state.lock();
        state.penalty_until = match state.penalty_until {
            Some(existing) if existing > until => Some(existing),
            _ => Some(until),
        };
        tracing::debug!(seconds, "rate limiter penalized");
    }

    /// Tokens currently available (diagnostic).
    pub fn available(&self) -> f64 {
        let now = self.clock.now();
        let mut state = self.state.lock();
        self.refill(&mut state, now);
        state.tokens
    }
}

#[cfg(test)]
#[path = "limiter_tests.rs"]
mod tests;
