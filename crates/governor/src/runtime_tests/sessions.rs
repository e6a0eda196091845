// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session completion handling: finalize, promote, transition upstream.

use super::*;
use crate::evaluate::EventOutcome;
use fm_core::{Clock, SessionStatus, WorkType, WorkerId};
use fm_store::StatusPatch;

/// Dispatch, claim, and complete one session; return its id.
async fn run_session_to_completion(ctx: &TestContext, issue_id: &str, status: &str) -> String {
    ctx.governor.handle_event(&status_event(issue(issue_id, status))).await;
    let session_id = ctx.governor.store().queue_snapshot()[0].session_id.as_str().to_string();
    let worker = WorkerId::new("wrk-1");
    ctx.governor.store().claim_session(&session_id, &worker);
    ctx.governor.store().update_session_status(
        &session_id,
        &worker,
        SessionStatus::Completed,
        StatusPatch::default(),
    );
    session_id
}

#[tokio::test]
async fn completion_transitions_development_to_finished() {
    let ctx = setup();
    let session_id = run_session_to_completion(&ctx, "iss-1", "Backlog").await;

    let outcome = ctx
        .governor
        .handle_event(&completed_event(issue("iss-1", "Backlog"), &session_id, true))
        .await;
    assert!(matches!(outcome, EventOutcome::Finalized { .. }));

    let updates = ctx.adapter.status_updates.lock();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].0.as_str(), "iss-1");
    assert_eq!(updates[0].1.as_str(), "Finished");
}

#[tokio::test]
async fn failed_qa_transitions_to_rejected() {
    let ctx = setup();
    ctx.governor.handle_event(&status_event(issue("iss-1", "Finished"))).await;
    let session_id = ctx.governor.store().queue_snapshot()[0].session_id.as_str().to_string();
    let worker = WorkerId::new("wrk-1");
    ctx.governor.store().claim_session(&session_id, &worker);
    ctx.governor.store().update_session_status(
        &session_id,
        &worker,
        SessionStatus::Failed,
        StatusPatch::default(),
    );

    ctx.governor
        .handle_event(&completed_event(issue("iss-1", "Finished"), &session_id, false))
        .await;
    let updates = ctx.adapter.status_updates.lock();
    assert_eq!(updates[0].1.as_str(), "Rejected");
}

#[tokio::test]
async fn failed_development_makes_no_transition() {
    let ctx = setup();
    ctx.governor.handle_event(&status_event(issue("iss-1", "Backlog"))).await;
    let session_id = ctx.governor.store().queue_snapshot()[0].session_id.as_str().to_string();
    let worker = WorkerId::new("wrk-1");
    ctx.governor.store().claim_session(&session_id, &worker);
    ctx.governor.store().update_session_status(
        &session_id,
        &worker,
        SessionStatus::Failed,
        StatusPatch::default(),
    );

    ctx.governor
        .handle_event(&completed_event(issue("iss-1", "Backlog"), &session_id, false))
        .await;
    assert_eq!(ctx.adapter.status_update_count(), 0);
}

#[tokio::test]
async fn completed_research_marks_the_phase_and_suppresses_retrigger() {
    let ctx = setup();
    let session_id = run_session_to_completion(&ctx, "iss-2", "Icebox").await;
    ctx.governor
        .handle_event(&completed_event(issue("iss-2", "Icebox"), &session_id, true))
        .await;
    assert!(ctx
        .governor
        .store()
        .phase_completed("iss-2", fm_core::ProcessingPhase::Research));

    // cooldown over, but research never re-triggers
    ctx.clock.advance_ms(ctx.governor.config().cooldown_ms + 1);
    ctx.governor.store().clear_dedup();
    let outcome = ctx.governor.handle_event(&status_event(issue("iss-2", "Icebox"))).await;
    assert!(matches!(outcome, EventOutcome::Dropped { .. }));
}

#[tokio::test]
async fn promotion_dispatches_parked_work_on_completion() {
    let ctx = setup();
    let session_id = run_session_to_completion(&ctx, "iss-1", "Backlog").await;

    // park QA work behind the (still locked) issue at store level, the way
    // a second governor instance would have
    let parked = fm_core::QueuedWork {
        session_id: fm_core::SessionId::new("sess-qa"),
        issue_id: "iss-1".into(),
        issue_identifier: "PROJ-iss-1".to_string(),
        priority: 30,
        queued_at_ms: ctx.clock.epoch_ms(),
        prompt: "qa".to_string(),
        provider_session_id: None,
        work_type: WorkType::Qa,
        project: None,
    };
    let record = fm_core::SessionRecord {
        session_id: parked.session_id.clone(),
        issue_id: parked.issue_id.clone(),
        issue_identifier: parked.issue_identifier.clone(),
        worker_id: None,
        work_type: parked.work_type,
        status: SessionStatus::Pending,
        created_at_ms: 0,
        updated_at_ms: 0,
        queued_at_ms: Some(0),
        claimed_at_ms: None,
        worktree_path: None,
        provider_session_id: None,
        organization_id: None,
        priority: parked.priority,
        prompt_context: None,
        total_cost_usd: None,
        input_tokens: None,
        output_tokens: None,
    };
    let dispatch = ctx.governor.store().dispatch(record, parked);
    assert!(dispatch.parked);

    let outcome = ctx
        .governor
        .handle_event(&completed_event(issue("iss-1", "Backlog"), &session_id, true))
        .await;
    match outcome {
        EventOutcome::Finalized { promoted: Some(promoted) } => {
            assert_eq!(promoted, "sess-qa");
        }
        other => panic!("expected promotion, got {other:?}"),
    }
    assert_eq!(ctx.governor.store().queue_snapshot()[0].session_id, "sess-qa");
}

#[tokio::test]
async fn unknown_session_completion_drops() {
    let ctx = setup();
    let outcome = ctx
        .governor
        .handle_event(&completed_event(issue("iss-1", "Backlog"), "sess-ghost", true))
        .await;
    assert!(matches!(outcome, EventOutcome::Dropped { .. }));
}
