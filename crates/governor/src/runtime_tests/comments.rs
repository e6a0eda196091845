// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Override engine behavior through comment events.

use super::*;
use crate::evaluate::EventOutcome;
use fm_core::{Directive, SessionStatus, WorkerId};

#[tokio::test]
async fn hold_stores_override_and_blocks_dispatch() {
    let ctx = setup();
    let outcome = ctx
        .governor
        .handle_event(&comment_event(issue("iss-1", "Backlog"), "c-1", "HOLD - investigating"))
        .await;
    assert!(matches!(
        outcome,
        EventOutcome::OverrideApplied { directive: "hold", followup: None }
    ));

    let record = ctx.governor.store().get_override("iss-1").unwrap();
    assert!(record.directive.is_hold());
    assert_eq!(record.reason.as_deref(), Some("investigating"));

    // held: the status event dispatches nothing
    let outcome = ctx.governor.handle_event(&status_event(issue("iss-1", "Backlog"))).await;
    assert!(matches!(outcome, EventOutcome::Dropped { ref reason } if reason.contains("held")));
    assert_eq!(ctx.governor.store().queue_len(), 0);
}

#[tokio::test]
async fn resume_clears_and_reevaluates_immediately() {
    let ctx = setup();
    ctx.governor
        .handle_event(&comment_event(issue("iss-1", "Backlog"), "c-1", "HOLD"))
        .await;
    let outcome = ctx
        .governor
        .handle_event(&comment_event(issue("iss-1", "Backlog"), "c-2", "RESUME"))
        .await;
    match outcome {
        EventOutcome::OverrideApplied { directive: "resume", followup: Some(followup) } => {
            assert!(matches!(*followup, EventOutcome::Dispatched { .. }));
        }
        other => panic!("expected resume with dispatch, got {other:?}"),
    }
    assert!(ctx.governor.store().get_override("iss-1").is_none());
    assert_eq!(ctx.governor.store().queue_len(), 1);
}

#[tokio::test]
async fn skip_qa_suppresses_qa_dispatch() {
    let ctx = setup();
    ctx.governor
        .handle_event(&comment_event(issue("iss-1", "Finished"), "c-1", "SKIP QA"))
        .await;
    let outcome = ctx.governor.handle_event(&status_event(issue("iss-1", "Finished"))).await;
    assert!(matches!(outcome, EventOutcome::Dropped { ref reason } if reason.contains("skip-qa")));
}

#[tokio::test]
async fn priority_override_pins_queue_priority() {
    let ctx = setup();
    ctx.governor
        .handle_event(&comment_event(issue("iss-1", "Backlog"), "c-1", "PRIORITY: high"))
        .await;
    let record = ctx.governor.store().get_override("iss-1").unwrap();
    assert!(matches!(record.directive, Directive::Priority { .. }));

    ctx.governor.handle_event(&status_event(issue("iss-1", "Backlog"))).await;
    let work = &ctx.governor.store().queue_snapshot()[0];
    assert_eq!(work.priority, fm_core::OverridePriority::High.queue_priority());
}

#[tokio::test]
async fn bot_comments_never_form_directives() {
    let ctx = setup();
    let mut event = comment_event(issue("iss-1", "Backlog"), "c-1", "HOLD");
    if let fm_core::GovernorEvent::CommentAdded { user_id, .. } = &mut event {
        *user_id = None; // no human author
    }
    let outcome = ctx.governor.handle_event(&event).await;
    assert!(matches!(outcome, EventOutcome::Dropped { .. }));
    assert!(ctx.governor.store().get_override("iss-1").is_none());
}

#[tokio::test]
async fn plain_comment_on_live_session_becomes_pending_prompt() {
    let ctx = setup();
    ctx.governor.handle_event(&status_event(issue("iss-1", "Backlog"))).await;
    let session_id = ctx.governor.store().queue_snapshot()[0].session_id.clone();
    ctx.governor.store().claim_session(session_id.as_str(), &WorkerId::new("wrk-1"));

    let outcome = ctx
        .governor
        .handle_event(&comment_event(issue("iss-1", "Backlog"), "c-9", "also update the docs"))
        .await;
    assert_eq!(outcome, EventOutcome::PromptStored { session_id: session_id.clone() });

    let prompts = ctx.governor.store().get_pending_prompts(session_id.as_str());
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0].prompt, "also update the docs");
    // nothing new queued
    assert_eq!(ctx.governor.store().queue_len(), 0);
}

#[tokio::test]
async fn reassign_stops_active_session_and_redispatches() {
    let ctx = setup();
    ctx.governor.handle_event(&status_event(issue("iss-1", "Backlog"))).await;
    let first_session = ctx.governor.store().queue_snapshot()[0].session_id.clone();
    let worker = WorkerId::new("wrk-1");
    ctx.governor.store().claim_session(first_session.as_str(), &worker);

    let outcome = ctx
        .governor
        .handle_event(&comment_event(issue("iss-1", "Backlog"), "c-1", "REASSIGN"))
        .await;
    match outcome {
        EventOutcome::OverrideApplied { directive: "reassign", followup: Some(followup) } => {
            assert!(matches!(*followup, EventOutcome::Dispatched { .. }));
        }
        other => panic!("expected reassign outcome, got {other:?}"),
    }
    assert_eq!(
        ctx.governor.store().get_session(first_session.as_str()).unwrap().status,
        SessionStatus::Stopped
    );
    // the replacement session is queued and owns the lock
    let replacement = &ctx.governor.store().queue_snapshot()[0];
    assert_ne!(replacement.session_id, first_session);
    assert_eq!(
        ctx.governor.store().get_issue_lock("iss-1").unwrap().session_id,
        replacement.session_id
    );
}
