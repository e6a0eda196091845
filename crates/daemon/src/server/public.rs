// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sanitized, unauthenticated read-only surface.

use axum::extract::{Path, State};
use axum::Json;
use fm_core::{SessionRecord, SessionStatus};
use fm_upstream::QuotaSnapshot;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use super::error::ApiError;
use super::AppState;

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub queue_depth: usize,
    pub workers: usize,
    pub sessions: HashMap<String, usize>,
    pub quota: QuotaSnapshot,
}

/// `GET /public/stats`
pub async fn stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    let sessions = state
        .store()
        .sessions_by_status()
        .into_iter()
        .map(|(status, count)| (status.as_str().to_string(), count))
        .collect();
    Json(StatsResponse {
        queue_depth: state.store().queue_len(),
        workers: state.store().worker_count(),
        sessions,
        quota: state.governor.mediator().telemetry().snapshot(),
    })
}

/// What the public surface reveals about a session: ids and lifecycle
/// only, never prompts, paths, or cost figures.
#[derive(Debug, Serialize)]
pub struct PublicSession {
    pub public_id: String,
    pub issue_identifier: String,
    pub work_type: String,
    pub status: SessionStatus,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl PublicSession {
    fn sanitize(record: &SessionRecord) -> Self {
        Self {
            public_id: record.session_id.as_str().to_string(),
            issue_identifier: record.issue_identifier.clone(),
            work_type: record.work_type.as_str().to_string(),
            status: record.status,
            created_at_ms: record.created_at_ms,
            updated_at_ms: record.updated_at_ms,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionsResponse {
    pub sessions: Vec<PublicSession>,
}

/// `GET /public/sessions`
pub async fn sessions(State(state): State<Arc<AppState>>) -> Json<SessionsResponse> {
    let mut sessions: Vec<PublicSession> =
        state.store().all_sessions().iter().map(PublicSession::sanitize).collect();
    sessions.sort_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms));
    Json(SessionsResponse { sessions })
}

/// `GET /public/sessions/{public_id}`
pub async fn session(
    State(state): State<Arc<AppState>>,
    Path(public_id): Path<String>,
) -> Result<Json<PublicSession>, ApiError> {
    match state.store().get_session(&public_id) {
        Some(record) => Ok(Json(PublicSession::sanitize(&record))),
        None => Err(ApiError::NotFound),
    }
}
