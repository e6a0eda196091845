// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Quota accounting for upstream API usage.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide API usage counters.
#[derive(Debug, Default)]
pub struct QuotaTelemetry {
    calls_attempted: AtomicU64,
    calls_succeeded: AtomicU64,
    auth_failures: AtomicU64,
    rate_limited: AtomicU64,
    retries: AtomicU64,
    circuit_rejections: AtomicU64,
}

impl QuotaTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_attempt(&self) {
        self.calls_attempted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_success(&self) {
        self.calls_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_auth_failure(&self) {
        self.auth_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_circuit_rejection(&self) {
        self.circuit_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn api_call_count(&self) -> u64 {
        self.calls_succeeded.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> QuotaSnapshot {
        QuotaSnapshot {
            calls_attempted: self.calls_attempted.load(Ordering::Relaxed),
            calls_succeeded: self.calls_succeeded.load(Ordering::Relaxed),
            auth_failures: self.auth_failures.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            circuit_rejections: self.circuit_rejections.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of the counters, serialized on the public stats
/// surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaSnapshot {
    pub calls_attempted: u64,
    pub calls_succeeded: u64,
    pub auth_failures: u64,
    pub rate_limited: u64,
    pub retries: u64,
    pub circuit_rejections: u64,
}
