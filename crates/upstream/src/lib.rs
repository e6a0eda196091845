// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fm-upstream: mediated access to the issue tracker API.
//!
//! Every upstream call flows breaker → limiter → retry. The breaker check
//! comes first so an open circuit consumes no tokens; 429s feed the
//! limiter's penalty floor rather than the breaker.

pub mod breaker;
pub mod error;
pub mod limiter;
pub mod mediator;
pub mod telemetry;

pub use breaker::{CircuitBreaker, CircuitState};
pub use error::{CircuitOpenError, UpstreamError};
pub use limiter::RateLimiter;
pub use mediator::{ApiMediator, RetryPolicy};
pub use telemetry::{QuotaSnapshot, QuotaTelemetry};
