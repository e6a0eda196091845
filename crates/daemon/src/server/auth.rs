// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Opaque bearer-token check for worker routes.

use axum::http::HeaderMap;

use super::error::ApiError;

/// Require `Authorization: Bearer <token>` to match the configured token.
///
/// An empty configured token disables worker auth (test and single-host
/// setups).
pub fn require_bearer(headers: &HeaderMap, expected: &str) -> Result<(), ApiError> {
    if expected.is_empty() {
        return Ok(());
    }
    let presented = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    match presented {
        Some(token) if token == expected => Ok(()),
        _ => Err(ApiError::Unauthorized),
    }
}
