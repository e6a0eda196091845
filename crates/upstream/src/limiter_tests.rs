// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use fm_core::ManualClock;

fn limiter(capacity: f64, refill: f64) -> RateLimiter<ManualClock> {
    RateLimiter::new(ManualClock::new(), capacity, refill)
}

#[test]
fn bucket_starts_full() {
    let l = limiter(3.0, 1.0);
    assert!(l.try_acquire());
    assert!(l.try_acquire());
    assert!(l.try_acquire());
    assert!(!l.try_acquire());
}

#[test]
fn refill_restores_tokens_over_time() {
    let l = limiter(2.0, 1.0);
    assert!(l.try_acquire());
    assert!(l.try_acquire());
    assert!(!l.try_acquire());

    l.clock.advance(Duration::from_secs(1));
    assert!(l.try_acquire());
    assert!(!l.try_acquire());
}

#[test]
fn refill_caps_at_capacity() {
    let l = limiter(2.0, 10.0);
    l.clock.advance(Duration::from_secs(60));
    assert!((l.available() - 2.0).abs() < f64::EPSILON);
}

#[test]
fn penalty_blocks_even_with_tokens() {
    let l = limiter(5.0, 1.0);
    l.penalize(30.0);
    assert!(!l.try_acquire());
    assert!(l.time_to_ready() >= Duration::from_secs(29));

    l.clock.advance(Duration::from_secs(30));
    assert!(l.try_acquire());
}

#[test]
fn shorter_penalty_never_shrinks_the_floor() {
    let l = limiter(5.0, 1.0);
    l.penalize(30.0);
    l.penalize(1.0);
    l.clock.advance(Duration::from_secs(2));
    assert!(!l.try_acquire());
}

#[test]
fn time_to_ready_reflects_refill_deficit() {
    let l = limiter(1.0, 2.0);
    assert!(l.try_acquire());
    // one token at 2/s: ready in ~500ms
    let wait = l.time_to_ready();
    assert!(wait > Duration::from_millis(400) && wait <= Duration::from_millis(500));
}

#[tokio::test]
async fn acquire_returns_immediately_when_tokens_exist() {
    let l = limiter(1.0, 1.0);
    l.acquire().await;
    assert!(!l.try_acquire());
}
