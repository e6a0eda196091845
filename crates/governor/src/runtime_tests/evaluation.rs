// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status-change evaluation through the full governor path.

use super::*;
use crate::evaluate::{AgentAction, EventOutcome};
use fm_core::SessionStatus;

#[tokio::test]
async fn backlog_status_dispatches_development() {
    let ctx = setup();
    let outcome = ctx.governor.handle_event(&status_event(issue("iss-1", "Backlog"))).await;
    match outcome {
        EventOutcome::Dispatched { action, parked, session_id } => {
            assert_eq!(action, AgentAction::TriggerDevelopment);
            assert!(!parked);
            assert!(session_id.is_synthetic());
        }
        other => panic!("expected dispatch, got {other:?}"),
    }
    let store = ctx.governor.store();
    assert_eq!(store.queue_len(), 1);
    assert!(store.get_issue_lock("iss-1").is_some());
}

#[tokio::test]
async fn duplicate_within_window_dispatches_once() {
    let ctx = setup();
    let event = status_event(issue("iss-1", "Backlog"));
    let first = ctx.governor.handle_event(&event).await;
    assert!(matches!(first, EventOutcome::Dispatched { .. }));

    let second = ctx.governor.handle_event(&event).await;
    assert_eq!(second, EventOutcome::Duplicate);
    assert_eq!(ctx.governor.store().queue_len(), 1);
}

#[tokio::test]
async fn terminal_status_drops() {
    let ctx = setup();
    let outcome = ctx.governor.handle_event(&status_event(issue("iss-1", "Accepted"))).await;
    assert!(matches!(outcome, EventOutcome::Dropped { .. }));
    assert_eq!(ctx.governor.store().queue_len(), 0);
}

#[tokio::test]
async fn busy_issue_drops_follow_on_status_events() {
    let ctx = setup();
    ctx.governor.handle_event(&status_event(issue("iss-1", "Backlog"))).await;
    // the pending development session is still active; no second dispatch
    let outcome = ctx.governor.handle_event(&status_event(issue("iss-1", "Finished"))).await;
    assert!(
        matches!(outcome, EventOutcome::Dropped { ref reason } if reason.contains("already active"))
    );
    assert_eq!(ctx.governor.store().queue_len(), 1);
}

#[tokio::test]
async fn parent_finished_gets_qa_coordination() {
    let ctx = setup();
    ctx.governor.store().mark_parent("iss-3");
    let outcome = ctx.governor.handle_event(&status_event(issue("iss-3", "Finished"))).await;
    assert!(matches!(outcome, EventOutcome::Dispatched { .. }));
    let work = &ctx.governor.store().queue_snapshot()[0];
    assert_eq!(work.work_type, fm_core::WorkType::QaCoordination);
}

#[tokio::test]
async fn child_event_marks_its_parent() {
    let ctx = setup();
    let mut child = issue("iss-child", "Backlog");
    child.parent_id = Some("iss-parent".into());
    ctx.governor.handle_event(&status_event(child)).await;
    assert!(ctx.governor.store().is_known_parent("iss-parent"));
}

#[tokio::test]
async fn active_session_suppresses_redispatch() {
    let ctx = setup();
    ctx.governor.handle_event(&status_event(issue("iss-1", "Backlog"))).await;
    ctx.governor.store().clear_dedup();
    let outcome = ctx.governor.handle_event(&status_event(issue("iss-1", "Backlog"))).await;
    assert!(
        matches!(outcome, EventOutcome::Dropped { ref reason } if reason.contains("already active"))
    );
}

#[tokio::test]
async fn icebox_triggers_research_with_reason() {
    let ctx = setup();
    // issue created at 1_000ms, clock at 100h: well past the delay
    let outcome = ctx.governor.handle_event(&status_event(issue("iss-2", "Icebox"))).await;
    match outcome {
        EventOutcome::Dispatched { action, .. } => {
            assert_eq!(action, AgentAction::TriggerResearch)
        }
        other => panic!("expected research, got {other:?}"),
    }
    let work = &ctx.governor.store().queue_snapshot()[0];
    assert_eq!(work.work_type, fm_core::WorkType::Research);
}

#[tokio::test]
async fn cooldown_after_terminal_session_suppresses_dispatch() {
    let ctx = setup();
    ctx.governor.handle_event(&status_event(issue("iss-1", "Backlog"))).await;
    let session_id = ctx.governor.store().queue_snapshot()[0].session_id.clone();
    let worker = fm_core::WorkerId::new("wrk-1");
    ctx.governor.store().claim_session(session_id.as_str(), &worker);
    ctx.governor.store().update_session_status(
        session_id.as_str(),
        &worker,
        SessionStatus::Completed,
        fm_store::StatusPatch::default(),
    );
    ctx.governor.handle_event(&completed_event(issue("iss-1", "Backlog"), session_id.as_str(), true)).await;

    ctx.governor.store().clear_dedup();
    let outcome = ctx.governor.handle_event(&status_event(issue("iss-1", "Finished"))).await;
    assert!(
        matches!(outcome, EventOutcome::Dropped { ref reason } if reason.contains("cooling down"))
    );

    // cooldown lapses, dispatch resumes
    ctx.clock.advance_ms(ctx.governor.config().cooldown_ms + 1);
    ctx.governor.store().clear_dedup();
    let outcome = ctx.governor.handle_event(&status_event(issue("iss-1", "Finished"))).await;
    assert!(matches!(outcome, EventOutcome::Dispatched { .. }));
}
