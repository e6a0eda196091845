// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The composed call path: breaker → limiter → call → classify → retry.

use fm_core::{BreakerConfig, Clock, RateLimitConfig};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::breaker::CircuitBreaker;
use crate::error::UpstreamError;
use crate::limiter::RateLimiter;
use crate::telemetry::QuotaTelemetry;

/// Backoff policy for transient upstream failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            multiplier: 2,
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.saturating_pow(attempt);
        (self.base_delay * factor).min(self.max_delay)
    }
}

/// Shared mediator every upstream operation goes through.
pub struct ApiMediator<C: Clock> {
    limiter: Arc<RateLimiter<C>>,
    breaker: Arc<CircuitBreaker<C>>,
    telemetry: Arc<QuotaTelemetry>,
    retry: RetryPolicy,
}

impl<C: Clock> ApiMediator<C> {
    pub fn new(clock: C, rate_limit: &RateLimitConfig, breaker: BreakerConfig) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::new(
                clock.clone(),
                rate_limit.capacity,
                rate_limit.refill_per_second,
            )),
            breaker: Arc::new(CircuitBreaker::new(clock, breaker)),
            telemetry: Arc::new(QuotaTelemetry::new()),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn limiter(&self) -> &Arc<RateLimiter<C>> {
        &self.limiter
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker<C>> {
        &self.breaker
    }

    pub fn telemetry(&self) -> &Arc<QuotaTelemetry> {
        &self.telemetry
    }

    /// Run one upstream operation through the full path.
    ///
    /// The breaker gate precedes the limiter so an open circuit never
    /// spends a token. Auth failures trip the breaker and are never
    /// retried inline; 429 penalizes the limiter and retries; 5xx,
    /// network, and timeout errors retry with exponential backoff.
    pub async fn call<T, F, Fut>(&self, op: &str, f: F) -> Result<T, UpstreamError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, UpstreamError>>,
    {
        let mut transient_attempts: u32 = 0;
        loop {
            if let Err(open) = self.breaker.can_proceed() {
                self.telemetry.record_circuit_rejection();
                tracing::warn!(op, retry_after_ms = open.retry_after_ms, "circuit open");
                return Err(open.into());
            }
            self.limiter.acquire().await;
            self.telemetry.record_attempt();

            match f().await {
                Ok(value) => {
                    self.breaker.record_success();
                    self.telemetry.record_success();
                    return Ok(value);
                }
                Err(err) if err.is_auth_error() => {
                    self.breaker.record_auth_failure(err.http_status());
                    self.telemetry.record_auth_failure();
                    tracing::warn!(op, error = %err, "auth failure");
                    return Err(err);
                }
                Err(err) if err.is_rate_limited() => {
                    let seconds = err.retry_after_seconds().unwrap_or(1) as f64;
                    self.limiter.penalize(seconds);
                    self.telemetry.record_rate_limited();
                    transient_attempts += 1;
                    if transient_attempts >= self.retry.max_attempts {
                        return Err(err);
                    }
                    tracing::debug!(op, seconds, "rate limited, retrying after penalty");
                }
                Err(err) if err.is_retryable() => {
                    transient_attempts += 1;
                    if transient_attempts >= self.retry.max_attempts {
                        tracing::warn!(op, error = %err, "retries exhausted");
                        return Err(err);
                    }
                    let delay = self.retry.delay_for(transient_attempts - 1);
                    self.telemetry.record_retry();
                    tracing::debug!(op, error = %err, ?delay, "transient failure, backing off");
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
#[path = "mediator_tests.rs"]
mod tests;
