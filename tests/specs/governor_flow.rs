// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end governor flows: events in through the bus, acks out.

use super::prelude::*;
use fm_core::{Clock, IssueStatus, TopOfFunnelConfig, WorkType};
use fm_governor::{AgentAction, EventOutcome};
use tokio_util::sync::CancellationToken;

/// Status `Icebox → Backlog`: the governor dispatches development work
/// and acks the envelope.
#[tokio::test]
async fn icebox_to_backlog_dispatches_development() {
    let s = spec();
    let id = s.bus.publish(status_event(issue("I-1", "Backlog"))).unwrap();

    let cancel = CancellationToken::new();
    let run_cancel = cancel.clone();
    let handle = {
        let bus = s.bus.clone();
        tokio::spawn(async move {
            // close the bus once the envelope is acked so the loop ends
            loop {
                if bus.pending_ack_count() == 0 {
                    bus.close();
                    return;
                }
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            }
        })
    };
    s.governor.run(run_cancel).await.unwrap();
    handle.await.unwrap();
    drop(cancel);

    assert!(!s.bus.ack(id), "envelope must already be acked by the loop");
    assert_eq!(s.store.queue_len(), 1);
    let work = &s.store.queue_snapshot()[0];
    assert_eq!(work.work_type, WorkType::Development);
    assert_eq!(work.issue_identifier, "PROJ-I-1");
}

/// The same status twice within the dedup window dispatches once; both
/// envelopes are acked.
#[tokio::test]
async fn duplicate_status_events_dispatch_once() {
    let s = spec();
    let first = s.governor.handle_event(&status_event(issue("I-1", "Backlog"))).await;
    assert!(matches!(first, EventOutcome::Dispatched { .. }));

    s.clock.advance_ms(5_000); // still inside the 10s window
    let second = s.governor.handle_event(&status_event(issue("I-1", "Backlog"))).await;
    assert_eq!(second, EventOutcome::Duplicate);
    assert_eq!(s.store.queue_len(), 1);
}

/// Issue in Icebox with a thin description created 2h ago researches,
/// with the canonical reason text.
#[tokio::test]
async fn stale_thin_icebox_issue_triggers_research() {
    let s = spec();
    let mut icebox = issue("I-2", "Icebox");
    icebox.description = Some("Fix the thing.".to_string());
    icebox.created_at_ms = s.clock.epoch_ms() - 2 * 3_600_000;

    let context = fm_governor::IssueContext::default();
    let action = fm_governor::determine_top_of_funnel_action(
        &icebox,
        &TopOfFunnelConfig::default(),
        &context,
        s.clock.epoch_ms(),
    );
    assert_eq!(action.kind, fm_governor::TofActionKind::TriggerResearch);
    assert!(action.reason.contains("lacks sufficient detail"));

    let outcome = s.governor.handle_event(&status_event(icebox)).await;
    match outcome {
        EventOutcome::Dispatched { action, .. } => {
            assert_eq!(action, AgentAction::TriggerResearch)
        }
        other => panic!("expected research dispatch, got {other:?}"),
    }
}

/// A parent issue in Finished derives qa-coordination, not qa.
#[tokio::test]
async fn parent_finished_derives_qa_coordination() {
    let s = spec();
    s.store.mark_parent("I-3");
    s.governor.handle_event(&status_event(issue("I-3", "Finished"))).await;
    assert_eq!(s.store.queue_snapshot()[0].work_type, WorkType::QaCoordination);
}

/// Completion drives the upstream status transition table.
#[tokio::test]
async fn development_completion_moves_issue_to_finished() {
    let s = spec();
    s.governor.handle_event(&status_event(issue("I-1", "Backlog"))).await;
    let session_id = s.store.queue_snapshot()[0].session_id.clone();
    let worker = fm_core::WorkerId::new("wrk-1");
    s.store.claim_session(session_id.as_str(), &worker);
    s.store.update_session_status(
        session_id.as_str(),
        &worker,
        fm_core::SessionStatus::Completed,
        fm_store::StatusPatch::default(),
    );

    s.governor
        .handle_event(&completed_event(issue("I-1", "Backlog"), session_id.as_str(), true))
        .await;

    let updates = s.adapter.status_updates.lock();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].1, IssueStatus::new("Finished"));
    drop(updates);

    // the session's claim, lock, and queue entry are all gone
    assert!(s.store.get_issue_lock("I-1").is_none());
    assert_eq!(s.store.queue_len(), 0);
}
