// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Route tests against an in-process server.

use super::*;
use axum_test::TestServer;
use fm_core::{
    GovernorConfig, IssueId, QueuedWork, SessionId, SessionRecord, SessionStatus, SystemClock,
    WorkType,
};
use fm_governor::{EventBus, FakeAdapter, Governor};
use serde_json::json;

const TOKEN: &str = "tok-1";

struct Fixture {
    server: TestServer,
    state: Arc<AppState>,
}

fn fixture() -> Fixture {
    let config = GovernorConfig {
        projects: vec!["platform".to_string()],
        worker_auth_token: TOKEN.to_string(),
        ..Default::default()
    };
    let clock = SystemClock;
    let store = Arc::new(Store::new(clock.clone()));
    let bus = EventBus::new();
    let governor = Arc::new(Governor::new(
        config,
        clock,
        store,
        bus,
        Arc::new(FakeAdapter::new()),
    ));
    let state = Arc::new(AppState::new(governor, 60_000));
    let server = match TestServer::new(router(state.clone())) {
        Ok(server) => server,
        Err(err) => panic!("test server: {err}"),
    };
    Fixture { server, state }
}

/// Seed one pending session with queued work; returns the session id.
fn seed_work(state: &AppState, session: &str, issue: &str) -> String {
    let work = QueuedWork {
        session_id: SessionId::new(session),
        issue_id: IssueId::new(issue),
        issue_identifier: format!("PROJ-{issue}"),
        priority: 50,
        queued_at_ms: 1,
        prompt: "implement".to_string(),
        provider_session_id: None,
        work_type: WorkType::Development,
        project: None,
    };
    let record = SessionRecord {
        session_id: work.session_id.clone(),
        issue_id: work.issue_id.clone(),
        issue_identifier: work.issue_identifier.clone(),
        worker_id: None,
        work_type: work.work_type,
        status: SessionStatus::Pending,
        created_at_ms: 1,
        updated_at_ms: 1,
        queued_at_ms: Some(1),
        claimed_at_ms: None,
        worktree_path: None,
        provider_session_id: None,
        organization_id: None,
        priority: work.priority,
        prompt_context: Some(work.prompt.clone()),
        total_cost_usd: None,
        input_tokens: None,
        output_tokens: None,
    };
    state.store().dispatch(record, work);
    session.to_string()
}

async fn register_worker(fx: &Fixture) -> String {
    let response = fx
        .server
        .post("/workers/register")
        .authorization_bearer(TOKEN)
        .json(&json!({ "hostname": "host-1", "capacity": 2 }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<serde_json::Value>()["worker_id"]
        .as_str()
        .map(String::from)
        .unwrap_or_default()
}

#[tokio::test]
async fn register_requires_token() {
    let fx = fixture();
    let response = fx
        .server
        .post("/workers/register")
        .json(&json!({ "hostname": "host-1", "capacity": 2 }))
        .await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_rejects_zero_capacity() {
    let fx = fixture();
    let response = fx
        .server
        .post("/workers/register")
        .authorization_bearer(TOKEN)
        .json(&json!({ "hostname": "host-1", "capacity": 0 }))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn heartbeat_unknown_worker_is_404() {
    let fx = fixture();
    let response = fx
        .server
        .post("/workers/wrk-ghost/heartbeat")
        .authorization_bearer(TOKEN)
        .json(&json!({ "active_count": 0 }))
        .await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn poll_returns_queued_work() {
    let fx = fixture();
    let worker_id = register_worker(&fx).await;
    seed_work(&fx.state, "sess-1", "iss-1");

    let response = fx
        .server
        .get(&format!("/workers/{worker_id}/poll"))
        .authorization_bearer(TOKEN)
        .await;
    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["work"].as_array().map(|a| a.len()), Some(1));
}

#[tokio::test]
async fn claim_then_lost_race() {
    let fx = fixture();
    let worker_id = register_worker(&fx).await;
    seed_work(&fx.state, "sess-1", "iss-1");

    let response = fx
        .server
        .post("/sessions/sess-1/claim")
        .authorization_bearer(TOKEN)
        .json(&json!({ "worker_id": worker_id }))
        .await;
    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["claimed"], true);
    assert_eq!(body["work"]["session_id"], "sess-1");

    // second claim loses with a machine-readable reason
    let response = fx
        .server
        .post("/sessions/sess-1/claim")
        .authorization_bearer(TOKEN)
        .json(&json!({ "worker_id": "wrk-other" }))
        .await;
    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["claimed"], false);
    assert_eq!(body["reason"], "wrong_status");
}

#[tokio::test]
async fn status_updates_enforce_worker_and_lattice() {
    let fx = fixture();
    let worker_id = register_worker(&fx).await;
    seed_work(&fx.state, "sess-1", "iss-1");
    fx.server
        .post("/sessions/sess-1/claim")
        .authorization_bearer(TOKEN)
        .json(&json!({ "worker_id": worker_id }))
        .await;

    // wrong worker: 403
    let response = fx
        .server
        .post("/sessions/sess-1/status")
        .authorization_bearer(TOKEN)
        .json(&json!({ "worker_id": "wrk-imposter", "status": "running" }))
        .await;
    response.assert_status(axum::http::StatusCode::FORBIDDEN);

    // owner: ok
    let response = fx
        .server
        .post("/sessions/sess-1/status")
        .authorization_bearer(TOKEN)
        .json(&json!({ "worker_id": worker_id, "status": "running", "worktree_path": "/tmp/wt" }))
        .await;
    response.assert_status_ok();

    // backwards: 409
    let response = fx
        .server
        .post("/sessions/sess-1/status")
        .authorization_bearer(TOKEN)
        .json(&json!({ "worker_id": worker_id, "status": "claimed" }))
        .await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn terminal_status_publishes_completion_event() {
    let fx = fixture();
    let worker_id = register_worker(&fx).await;
    seed_work(&fx.state, "sess-1", "iss-1");
    fx.server
        .post("/sessions/sess-1/claim")
        .authorization_bearer(TOKEN)
        .json(&json!({ "worker_id": worker_id }))
        .await;

    let response = fx
        .server
        .post("/sessions/sess-1/status")
        .authorization_bearer(TOKEN)
        .json(&json!({ "worker_id": worker_id, "status": "completed" }))
        .await;
    response.assert_status_ok();
    // the governor loop is not running in route tests; the completion
    // event sits on the bus awaiting its single subscriber
    assert_eq!(fx.state.governor.bus().pending_ack_count(), 1);
}

#[tokio::test]
async fn prompts_round_trip() {
    let fx = fixture();
    seed_work(&fx.state, "sess-1", "iss-1");
    let stored = fx.state.store().store_pending_prompt(
        &SessionId::new("sess-1"),
        &IssueId::new("iss-1"),
        "also fix the docs",
        None,
    );

    let response = fx
        .server
        .get("/sessions/sess-1/prompts")
        .authorization_bearer(TOKEN)
        .await;
    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["prompts"].as_array().map(|a| a.len()), Some(1));

    let response = fx
        .server
        .post("/sessions/sess-1/prompts")
        .authorization_bearer(TOKEN)
        .json(&json!({ "prompt_id": stored.id.as_str() }))
        .await;
    response.assert_status_ok();

    // claiming again conflicts
    let response = fx
        .server
        .post("/sessions/sess-1/prompts")
        .authorization_bearer(TOKEN)
        .json(&json!({ "prompt_id": stored.id.as_str() }))
        .await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn synthetic_sessions_ack_without_forwarding() {
    let fx = fixture();
    let session_id = SessionId::synthetic();
    seed_work(&fx.state, session_id.as_str(), "iss-1");

    let response = fx
        .server
        .post(&format!("/sessions/{session_id}/activity"))
        .authorization_bearer(TOKEN)
        .json(&json!({ "message": "compiling" }))
        .await;
    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["acked"], true);
    assert_eq!(body["forwarded"], false);
}

#[tokio::test]
async fn tracker_sessions_forward_upstream() {
    let fx = fixture();
    seed_work(&fx.state, "sess-real", "iss-1");

    let response = fx
        .server
        .post("/sessions/sess-real/progress")
        .authorization_bearer(TOKEN)
        .json(&json!({ "pct": 50 }))
        .await;
    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["forwarded"], true);
}

#[tokio::test]
async fn unknown_forward_kind_is_404() {
    let fx = fixture();
    seed_work(&fx.state, "sess-1", "iss-1");
    let response = fx
        .server
        .post("/sessions/sess-1/definitely-not-a-kind")
        .authorization_bearer(TOKEN)
        .json(&json!({}))
        .await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn webhook_publishes_and_dedups_deliveries() {
    let fx = fixture();
    let payload = json!({
        "action": "update",
        "type": "Issue",
        "updatedFrom": { "stateId": "old" },
        "data": { "id": "iss-1", "identifier": "PROJ-1", "state": { "name": "Backlog" } }
    });

    let response = fx
        .server
        .post("/webhook")
        .add_header("x-delivery-id", "d-1")
        .json(&payload)
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<serde_json::Value>()["published"], 1);

    // same delivery id: acked, nothing published
    let response = fx
        .server
        .post("/webhook")
        .add_header("x-delivery-id", "d-1")
        .json(&payload)
        .await;
    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["published"], 0);
    assert_eq!(body["duplicate"], true);
}

#[tokio::test]
async fn webhook_acks_unrecognized_shapes() {
    let fx = fixture();
    let response = fx.server.post("/webhook").json(&json!({ "hello": "world" })).await;
    response.assert_status_ok();
    assert_eq!(response.json::<serde_json::Value>()["published"], 0);
}

#[tokio::test]
async fn public_stats_and_sessions_are_open_and_sanitized() {
    let fx = fixture();
    seed_work(&fx.state, "sess-1", "iss-1");

    let response = fx.server.get("/public/stats").await;
    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["queue_depth"], 1);

    let response = fx.server.get("/public/sessions/sess-1").await;
    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["public_id"], "sess-1");
    // prompt text never leaks on the public surface
    assert!(body.get("prompt_context").is_none());

    let response = fx.server.get("/public/sessions/sess-ghost").await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}
