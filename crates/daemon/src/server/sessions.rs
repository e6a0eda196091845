// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session routes: claim, status, lock refresh, prompts, transfer, and
//! upstream event forwarding.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use fm_core::{
    PendingPrompt, QueuedWork, SessionEventKind, SessionRecord, SessionStatus, WorkerId,
};
use fm_store::{ClaimOutcome, StatusPatch, StatusUpdateOutcome, TransferOutcome};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::auth::require_bearer;
use super::error::ApiError;
use super::AppState;

#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    pub worker_id: String,
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub claimed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work: Option<QueuedWork>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// `POST /sessions/{id}/claim`
pub async fn claim(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<ClaimRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    require_bearer(&headers, state.auth_token())?;
    let worker_id = WorkerId::new(req.worker_id);
    match state.store().claim_session(&session_id, &worker_id) {
        ClaimOutcome::Claimed { session, work } => Ok(Json(ClaimResponse {
            claimed: true,
            session: Some(session),
            work: Some(work),
            reason: None,
        })),
        ClaimOutcome::Rejected { reason } => {
            tracing::debug!(session = %session_id, reason = reason.as_str(), "claim lost");
            Ok(Json(ClaimResponse {
                claimed: false,
                session: None,
                work: None,
                reason: Some(reason.as_str().to_string()),
            }))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub worker_id: String,
    pub status: SessionStatus,
    #[serde(default)]
    pub provider_session_id: Option<String>,
    #[serde(default)]
    pub worktree_path: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub total_cost_usd: Option<f64>,
    #[serde(default)]
    pub input_tokens: Option<u64>,
    #[serde(default)]
    pub output_tokens: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub updated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<SessionStatus>,
}

/// `POST /sessions/{id}/status`
pub async fn status(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<StatusRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    require_bearer(&headers, state.auth_token())?;
    let worker_id = WorkerId::new(req.worker_id);
    if let Some(error) = &req.error {
        tracing::warn!(session = %session_id, error, "worker reported session error");
    }
    let patch = StatusPatch {
        provider_session_id: req.provider_session_id,
        worktree_path: req.worktree_path,
        total_cost_usd: req.total_cost_usd,
        input_tokens: req.input_tokens,
        output_tokens: req.output_tokens,
    };
    match state.store().update_session_status(&session_id, &worker_id, req.status, patch) {
        StatusUpdateOutcome::Updated { previous } => {
            if req.status.is_terminal() {
                if let Some(record) = state.store().get_session(&session_id) {
                    // Finalization runs on the governor loop, exactly once.
                    if let Err(err) = state.governor.publish_session_terminal(&record, req.status) {
                        tracing::warn!(session = %session_id, error = %err, "bus publish failed");
                    }
                }
            }
            Ok(Json(StatusResponse { updated: true, previous: Some(previous) }))
        }
        StatusUpdateOutcome::IgnoredTerminal => {
            Ok(Json(StatusResponse { updated: false, previous: None }))
        }
        StatusUpdateOutcome::InvalidTransition { from } => Err(ApiError::Conflict(format!(
            "cannot move from {from} to {}",
            req.status
        ))),
        StatusUpdateOutcome::Forbidden => Err(ApiError::Forbidden),
        StatusUpdateOutcome::NotFound => Err(ApiError::NotFound),
    }
}

#[derive(Debug, Deserialize)]
pub struct LockRefreshRequest {
    pub worker_id: String,
    pub issue_id: String,
}

#[derive(Debug, Serialize)]
pub struct LockRefreshResponse {
    pub refreshed: bool,
}

/// `POST /sessions/{id}/lock-refresh`
pub async fn lock_refresh(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<LockRefreshRequest>,
) -> Result<Json<LockRefreshResponse>, ApiError> {
    require_bearer(&headers, state.auth_token())?;
    let Some(record) = state.store().get_session(&session_id) else {
        return Err(ApiError::NotFound);
    };
    let owns = record.worker_id.as_ref().map(|w| w.as_str() == req.worker_id).unwrap_or(false);
    if !owns {
        return Err(ApiError::Forbidden);
    }
    let refreshed = state.store().refresh_issue_lock(&req.issue_id, &session_id);
    Ok(Json(LockRefreshResponse { refreshed }))
}

#[derive(Debug, Serialize)]
pub struct PromptsResponse {
    pub prompts: Vec<PendingPrompt>,
}

/// `GET /sessions/{id}/prompts`
pub async fn list_prompts(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<PromptsResponse>, ApiError> {
    require_bearer(&headers, state.auth_token())?;
    Ok(Json(PromptsResponse { prompts: state.store().get_pending_prompts(&session_id) }))
}

#[derive(Debug, Deserialize)]
pub struct ClaimPromptRequest {
    pub prompt_id: String,
}

#[derive(Debug, Serialize)]
pub struct ClaimPromptResponse {
    pub prompt: PendingPrompt,
}

/// `POST /sessions/{id}/prompts`: atomic claim by id.
pub async fn claim_prompt(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<ClaimPromptRequest>,
) -> Result<Json<ClaimPromptResponse>, ApiError> {
    require_bearer(&headers, state.auth_token())?;
    match state.store().claim_pending_prompt(&session_id, &req.prompt_id) {
        Some(prompt) => Ok(Json(ClaimPromptResponse { prompt })),
        None => Err(ApiError::Conflict("prompt already claimed or unknown".to_string())),
    }
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub new_worker_id: String,
    pub old_worker_id: String,
}

#[derive(Debug, Serialize)]
pub struct TransferResponse {
    pub transferred: bool,
}

/// `POST /sessions/{id}/transfer-ownership`
pub async fn transfer_ownership(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<TransferRequest>,
) -> Result<Json<TransferResponse>, ApiError> {
    require_bearer(&headers, state.auth_token())?;
    let old = WorkerId::new(req.old_worker_id);
    let new = WorkerId::new(req.new_worker_id);
    match state.store().transfer_ownership(&session_id, &old, &new) {
        TransferOutcome::Transferred => Ok(Json(TransferResponse { transferred: true })),
        TransferOutcome::WrongWorker => {
            Err(ApiError::Conflict("session owned by another worker".to_string()))
        }
        TransferOutcome::NotFound => Err(ApiError::NotFound),
    }
}

#[derive(Debug, Serialize)]
pub struct ForwardResponse {
    pub acked: bool,
    pub forwarded: bool,
}

/// `POST /sessions/{id}/{kind}`: activity/progress/completion/
/// external-urls/tool-error telemetry.
///
/// Synthetic (`governor-`) sessions are acked locally and never forwarded.
pub async fn forward_event(
    State(state): State<Arc<AppState>>,
    Path((session_id, kind)): Path<(String, String)>,
    headers: HeaderMap,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<ForwardResponse>, ApiError> {
    require_bearer(&headers, state.auth_token())?;
    let Some(kind) = SessionEventKind::from_path(&kind) else {
        return Err(ApiError::NotFound);
    };
    let Some(record) = state.store().get_session(&session_id) else {
        return Err(ApiError::NotFound);
    };
    if record.session_id.is_synthetic() {
        return Ok(Json(ForwardResponse { acked: true, forwarded: false }));
    }

    let adapter = state.governor.adapter();
    let session = record.session_id.clone();
    let result = state
        .governor
        .mediator()
        .call("forward_session_event", || {
            let adapter = adapter.clone();
            let session = session.clone();
            let payload = payload.clone();
            async move { adapter.forward_session_event(&session, kind, &payload).await }
        })
        .await;
    match result {
        Ok(()) => Ok(Json(ForwardResponse { acked: true, forwarded: true })),
        Err(err) => Err(ApiError::Upstream(err.to_string())),
    }
}
