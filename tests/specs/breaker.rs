// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Circuit breaker probe-timing spec.

use fm_core::{BreakerConfig, ManualClock};
use fm_upstream::{CircuitBreaker, CircuitState};
use std::time::Duration;

/// threshold=1, reset=5s: one auth failure at t=0 opens the circuit;
/// at t=4.999s calls still fail; at t=5.001s the circuit is half-open,
/// the first call is the single probe, and the second fails.
#[test]
fn probe_timing_boundary() {
    let clock = ManualClock::new();
    let breaker = CircuitBreaker::new(
        clock.clone(),
        BreakerConfig {
            failure_threshold: 1,
            reset_timeout_ms: 5_000,
            max_reset_timeout_ms: 300_000,
            backoff_multiplier: 2,
            auth_error_codes: vec![400, 401, 403],
        },
    );

    breaker.record_auth_failure(Some(401));
    assert_eq!(breaker.state(), CircuitState::Open);

    clock.advance(Duration::from_millis(4_999));
    assert!(breaker.can_proceed().is_err());

    clock.advance(Duration::from_millis(2));
    assert_eq!(breaker.state(), CircuitState::HalfOpen);
    assert!(breaker.can_proceed().is_ok(), "first call is the probe");
    assert!(breaker.can_proceed().is_err(), "second call must wait for the probe");
}

/// Once auth failures stop and the probe succeeds, the breaker closes
/// with its reset timeout back at the base value.
#[test]
fn recovery_restores_the_base_timeout() {
    let clock = ManualClock::new();
    let breaker = CircuitBreaker::new(
        clock.clone(),
        BreakerConfig {
            failure_threshold: 1,
            reset_timeout_ms: 5_000,
            max_reset_timeout_ms: 300_000,
            backoff_multiplier: 2,
            auth_error_codes: vec![400, 401, 403],
        },
    );

    // trip, fail a probe (timeout doubles to 10s), then recover
    breaker.record_auth_failure(Some(401));
    clock.advance(Duration::from_millis(5_001));
    assert!(breaker.can_proceed().is_ok());
    breaker.record_auth_failure(Some(401));

    clock.advance(Duration::from_millis(10_001));
    assert!(breaker.can_proceed().is_ok());
    breaker.record_success();
    assert_eq!(breaker.state(), CircuitState::Closed);

    // next trip waits the base 5s again
    breaker.record_auth_failure(Some(401));
    clock.advance(Duration::from_millis(5_001));
    assert!(breaker.can_proceed().is_ok());
}
