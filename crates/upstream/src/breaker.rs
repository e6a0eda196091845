// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Auth-failure circuit breaker.
//!
//! Closed counts consecutive auth failures; at the threshold the circuit
//! opens and every call fails fast until the reset timeout elapses. The
//! half-open state admits exactly one probe: success closes the circuit
//! and restores the base timeout, failure re-opens it with the timeout
//! doubled (capped).

use fm_core::{BreakerConfig, Clock};
use parking_lot::Mutex;
use std::time::Instant;

use crate::error::CircuitOpenError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

struct BreakerInner {
    state: CircuitState,
    consecutive_auth_failures: u32,
    current_reset_timeout_ms: u64,
    opened_at: Option<Instant>,
    probe_in_flight: bool,
}

/// Per-client breaker over upstream auth failures.
pub struct CircuitBreaker<C: Clock> {
    clock: C,
    config: BreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl<C: Clock> CircuitBreaker<C> {
    pub fn new(clock: C, config: BreakerConfig) -> Self {
        let base = config.reset_timeout_ms;
        Self {
            clock,
            config,
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                consecutive_auth_failures: 0,
                current_reset_timeout_ms: base,
                opened_at: None,
                probe_in_flight: false,
            }),
        }
    }

    /// Gate a call. `Ok` admits it; `Err` carries the remaining wait.
    ///
    /// Called before the rate limiter so an open circuit spends no tokens.
    pub fn can_proceed(&self) -> Result<(), CircuitOpenError> {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::Closed => Ok(()),
            CircuitState::Open => {
                let elapsed_ms = inner
                    .opened_at
                    .map(|at| now.saturating_duration_since(at).as_millis() as u64)
                    .unwrap_or(0);
                if elapsed_ms >= inner.current_reset_timeout_ms {
                    inner.state = CircuitState::HalfOpen;
                    inner.probe_in_flight = true;
                    tracing::info!("circuit half-open, admitting probe");
                    Ok(())
                } else {
                    Err(CircuitOpenError {
                        retry_after_ms: inner.current_reset_timeout_ms - elapsed_ms,
                    })
                }
            }
            CircuitState::HalfOpen => {
                if inner.probe_in_flight {
                    Err(CircuitOpenError { retry_after_ms: inner.current_reset_timeout_ms })
                } else {
                    inner.probe_in_flight = true;
                    Ok(())
                }
            }
        }
    }

    /// A call succeeded: reset the failure counter; a successful probe
    /// closes the circuit and restores the base timeout.
    pub fn record_success(&self) {
        let mut inner = self.inner.lock();
        inner.consecutive_auth_failures = 0;
        if inner.state != CircuitState::Closed {
            tracing::info!("circuit closed after successful probe");
        }
        inner.state = CircuitState::Closed;
        inner.current_reset_timeout_ms = self.config.reset_timeout_ms;
        inner.opened_at = None;
        inner.probe_in_flight = false;
    }

    /// An auth failure: count it, open at the threshold; a failed probe
    /// re-opens with the timeout doubled (capped).
    pub fn record_auth_failure(&self, status: Option<u16>) {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::HalfOpen => {
                inner.current_reset_timeout_ms = (inner.current_reset_timeout_ms
                    * self.config.backoff_multiplier as u64)
                    .min(self.config.max_reset_timeout_ms);
                inner.state = CircuitState::Open;
                inner.opened_at = Some(now);
                inner.probe_in_flight = false;
                tracing::warn!(
                    ?status,
                    reset_timeout_ms = inner.current_reset_timeout_ms,
                    "probe failed, circuit re-opened"
                );
            }
            _ => {
                inner.consecutive_auth_failures += 1;
                if inner.state == CircuitState::Closed
                    && inner.consecutive_auth_failures >= self.config.failure_threshold
                {
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(now);
                    tracing::warn!(
                        ?status,
                        failures = inner.consecutive_auth_failures,
                        "auth failures reached threshold, circuit opened"
                    );
                }
            }
        }
    }

    pub fn state(&self) -> CircuitState {
        // Surface the half-open transition without admitting a probe.
        let now = self.clock.now();
        let inner = self.inner.lock();
        match inner.state {
            CircuitState::Open => {
                let elapsed_ms = inner
                    .opened_at
                    .map(|at| now.saturating_duration_since(at).as_millis() as u64)
                    .unwrap_or(0);
                if elapsed_ms >= inner.current_reset_timeout_ms {
                    CircuitState::HalfOpen
                } else {
                    CircuitState::Open
                }
            }
            state => state,
        }
    }

    pub fn consecutive_auth_failures(&self) -> u32 {
        self.inner.lock().consecutive_auth_failures
    }
}

#[cfg(test)]
#[path = "breaker_tests.rs"]
mod tests;
