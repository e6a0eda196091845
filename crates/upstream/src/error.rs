// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Upstream error taxonomy.
//!
//! Classification drives the mediator: auth errors trip the breaker, 429
//! penalizes the limiter, 5xx/network/timeout retry with backoff, and
//! everything else surfaces to the caller untouched.

use std::time::Duration;
use thiserror::Error;

/// Raised when the circuit is open; callers fail fast without spending a
/// rate-limit token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("circuit open, retry after {retry_after_ms}ms")]
pub struct CircuitOpenError {
    pub retry_after_ms: u64,
}

/// Failure of one upstream API call.
#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    #[error(transparent)]
    CircuitOpen(#[from] CircuitOpenError),

    /// Non-2xx HTTP response.
    #[error("upstream returned {status}: {message}")]
    Status {
        status: u16,
        message: String,
        /// Parsed Retry-After, seconds.
        retry_after: Option<u64>,
        /// Response body for GraphQL error-shape probing.
        body: Option<serde_json::Value>,
    },

    /// GraphQL transport succeeded but the payload carries errors.
    #[error("graphql error: {message}")]
    GraphQl { message: String, body: serde_json::Value },

    #[error("network error: {0}")]
    Network(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl UpstreamError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status { status, message: message.into(), retry_after: None, body: None }
    }

    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Auth/quota-exhaustion classification (trips the circuit breaker).
    ///
    /// True for HTTP 400/401/403, for messages that read as access
    /// failures, and for the tracker's RATELIMITED GraphQL code. 429 is
    /// excluded: it feeds the rate limiter instead.
    pub fn is_auth_error(&self) -> bool {
        match self {
            Self::Status { status: 429, .. } => false,
            Self::Status { status, message, body, .. } => {
                matches!(status, 400 | 401 | 403)
                    || message_is_auth(message)
                    || body.as_ref().map(graphql_ratelimited).unwrap_or(false)
            }
            Self::GraphQl { message, body } => {
                message_is_auth(message) || graphql_ratelimited(body)
            }
            _ => false,
        }
    }

    /// 429: back off via the limiter, then retry.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Status { status: 429, .. })
    }

    /// Transient failures worth an exponential-backoff retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status >= 500,
            Self::Network(_) | Self::Timeout(_) => true,
            _ => false,
        }
    }

    /// Retry-After in seconds, when the response carried one.
    pub fn retry_after_seconds(&self) -> Option<u64> {
        match self {
            Self::Status { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

fn message_is_auth(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("access denied") || lower.contains("unauthorized") || lower.contains("forbidden")
}

/// Probe a response body for `extensions.code == "RATELIMITED"`.
///
/// The code may sit at the root, in a nested `errors` array, or under
/// `response.body`/`response.data` as the HTTP client wraps it.
pub(crate) fn graphql_ratelimited(value: &serde_json::Value) -> bool {
    fn code_matches(value: &serde_json::Value) -> bool {
        value
            .get("extensions")
            .and_then(|ext| ext.get("code"))
            .and_then(|code| code.as_str())
            .map(|code| code == "RATELIMITED")
            .unwrap_or(false)
    }

    fn errors_match(value: &serde_json::Value) -> bool {
        value
            .get("errors")
            .and_then(|errors| errors.as_array())
            .map(|errors| errors.iter().any(code_matches))
            .unwrap_or(false)
    }

    if code_matches(value) || errors_match(value) {
        return true;
    }
    if let Some(response) = value.get("response") {
        for key in ["body", "data"] {
            if let Some(inner) = response.get(key) {
                if errors_match(inner) {
                    return true;
                }
            }
        }
    }
    false
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
