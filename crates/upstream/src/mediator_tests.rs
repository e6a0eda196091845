// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::breaker::CircuitState;
use fm_core::ManualClock;
use std::sync::atomic::{AtomicU32, Ordering};

fn mediator() -> ApiMediator<ManualClock> {
    // generous bucket so acquire never sleeps in tests
    let rate = fm_core::RateLimitConfig { capacity: 1_000.0, refill_per_second: 1_000.0 };
    ApiMediator::new(ManualClock::new(), &rate, fm_core::BreakerConfig::default())
}

#[tokio::test]
async fn success_counts_toward_quota() {
    let m = mediator();
    let result: Result<u32, UpstreamError> = m.call("op", || async { Ok(7) }).await;
    assert_eq!(result.unwrap(), 7);
    assert_eq!(m.telemetry().api_call_count(), 1);
    assert_eq!(m.breaker().state(), CircuitState::Closed);
}

#[tokio::test(start_paused = true)]
async fn transient_errors_retry_up_to_three_attempts() {
    let m = mediator();
    let attempts = AtomicU32::new(0);
    let result: Result<u32, UpstreamError> = m
        .call("op", || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(UpstreamError::status(502, "bad gateway"))
                } else {
                    Ok(42)
                }
            }
        })
        .await;
    assert_eq!(result.unwrap(), 42);
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn retries_exhaust_and_surface_the_error() {
    let m = mediator();
    let attempts = AtomicU32::new(0);
    let result: Result<u32, UpstreamError> = m
        .call("op", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(UpstreamError::Network("reset".to_string())) }
        })
        .await;
    assert!(matches!(result, Err(UpstreamError::Network(_))));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn auth_errors_trip_the_breaker_without_retry() {
    let m = mediator();
    let attempts = AtomicU32::new(0);
    for _ in 0..2 {
        let result: Result<u32, UpstreamError> = m
            .call("op", || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(UpstreamError::status(401, "unauthorized")) }
            })
            .await;
        assert!(result.is_err());
    }
    // two failures = default threshold; never retried inline
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert_eq!(m.breaker().state(), CircuitState::Open);

    // open circuit fails fast without invoking the operation
    let result: Result<u32, UpstreamError> = m
        .call("op", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Ok(1) }
        })
        .await;
    assert!(matches!(result, Err(UpstreamError::CircuitOpen(_))));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert_eq!(m.telemetry().snapshot().circuit_rejections, 1);
}

#[tokio::test(start_paused = true)]
async fn rate_limit_penalizes_and_retries() {
    let m = mediator();
    let attempts = AtomicU32::new(0);
    let result: Result<u32, UpstreamError> = m
        .call("op", || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(UpstreamError::Status {
                        status: 429,
                        message: "slow down".to_string(),
                        retry_after: Some(0),
                        body: None,
                    })
                } else {
                    Ok(9)
                }
            }
        })
        .await;
    assert_eq!(result.unwrap(), 9);
    assert_eq!(m.telemetry().snapshot().rate_limited, 1);
    // 429 is not an auth failure
    assert_eq!(m.breaker().state(), CircuitState::Closed);
}

#[tokio::test]
async fn non_retryable_errors_surface_immediately() {
    let m = mediator();
    let attempts = AtomicU32::new(0);
    let result: Result<u32, UpstreamError> = m
        .call("op", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(UpstreamError::status(404, "missing")) }
        })
        .await;
    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}
