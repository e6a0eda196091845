// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker registry routes: register, heartbeat, poll.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use fm_core::{Clock, PendingPrompt, QueuedWork, WorkerId, WorkerRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use super::auth::require_bearer;
use super::error::ApiError;
use super::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub hostname: String,
    pub capacity: u32,
    #[serde(default)]
    pub version: Option<String>,
    /// Projects this worker serves; empty means any.
    #[serde(default)]
    pub projects: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub worker_id: String,
    pub lease_ms: u64,
}

/// `POST /workers/register`
pub async fn register(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    require_bearer(&headers, state.auth_token())?;
    if req.capacity == 0 {
        return Err(ApiError::BadRequest("capacity must be positive".to_string()));
    }
    let worker_id = WorkerId::new(format!("wrk-{}", nanoid::nanoid!(19)));
    let now = state.governor.clock().epoch_ms();
    state.store().register_worker(WorkerRecord {
        worker_id: worker_id.clone(),
        hostname: req.hostname,
        capacity: req.capacity,
        version: req.version,
        projects: req.projects,
        registered_at_ms: now,
        last_heartbeat_ms: now,
        active_count: 0,
    });
    tracing::info!(worker = %worker_id, "worker registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            worker_id: worker_id.as_str().to_string(),
            lease_ms: state.worker_lease_ms,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct HeartbeatRequest {
    pub active_count: u32,
    #[serde(default)]
    pub load: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct HeartbeatResponse {
    pub pending_work_count: usize,
}

/// `POST /workers/{id}/heartbeat`
pub async fn heartbeat(
    State(state): State<Arc<AppState>>,
    Path(worker_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<HeartbeatRequest>,
) -> Result<Json<HeartbeatResponse>, ApiError> {
    require_bearer(&headers, state.auth_token())?;
    if !state.store().worker_heartbeat(&worker_id, req.active_count) {
        return Err(ApiError::NotFound);
    }
    tracing::trace!(worker = %worker_id, active = req.active_count, load = ?req.load, "heartbeat");
    Ok(Json(HeartbeatResponse { pending_work_count: state.store().queue_len() }))
}

#[derive(Debug, Serialize)]
pub struct PollResponse {
    pub work: Vec<QueuedWork>,
    pub pending_prompts: HashMap<String, Vec<PendingPrompt>>,
}

/// `GET /workers/{id}/poll`
///
/// Only work whose project is unset or in the worker's project list is
/// returned, alongside pending prompts for this worker's sessions.
pub async fn poll(
    State(state): State<Arc<AppState>>,
    Path(worker_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<PollResponse>, ApiError> {
    require_bearer(&headers, state.auth_token())?;
    let Some(worker) = state.store().get_worker(&worker_id) else {
        return Err(ApiError::NotFound);
    };
    let work = state.store().poll_work(&worker);
    let session_ids = state.store().worker_session_ids(&worker_id);
    let pending_prompts = state.store().pending_prompts_for_sessions(&session_ids);
    Ok(Json(PollResponse { work, pending_prompts }))
}
