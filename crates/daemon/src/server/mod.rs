// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker HTTP API, public stats, and webhook ingress.

mod auth;
mod error;
mod public;
mod sessions;
mod webhook;
mod workers;

pub use error::{ApiError, ErrorBody, ErrorResponse};

use axum::routing::{get, post};
use axum::Router;
use fm_core::SystemClock;
use fm_governor::Governor;
use fm_store::Store;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state behind every route.
pub struct AppState {
    pub governor: Arc<Governor<SystemClock>>,
    pub worker_lease_ms: u64,
}

impl AppState {
    pub fn new(governor: Arc<Governor<SystemClock>>, worker_lease_ms: u64) -> Self {
        Self { governor, worker_lease_ms }
    }

    pub fn store(&self) -> &Arc<Store<SystemClock>> {
        self.governor.store()
    }

    pub fn auth_token(&self) -> &str {
        &self.governor.config().worker_auth_token
    }
}

/// Build the daemon router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/workers/register", post(workers::register))
        .route("/workers/{id}/heartbeat", post(workers::heartbeat))
        .route("/workers/{id}/poll", get(workers::poll))
        .route("/sessions/{id}/claim", post(sessions::claim))
        .route("/sessions/{id}/status", post(sessions::status))
        .route("/sessions/{id}/lock-refresh", post(sessions::lock_refresh))
        .route("/sessions/{id}/prompts", get(sessions::list_prompts).post(sessions::claim_prompt))
        .route("/sessions/{id}/transfer-ownership", post(sessions::transfer_ownership))
        .route("/sessions/{id}/{kind}", post(sessions::forward_event))
        .route("/public/stats", get(public::stats))
        .route("/public/sessions", get(public::sessions))
        .route("/public/sessions/{public_id}", get(public::session))
        .route("/webhook", post(webhook::ingest))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
