// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock exclusivity, queue ordering, and parked replacement specs.

use super::prelude::*;
use fm_core::{IssueId, QueuedWork, SessionId, SessionRecord, SessionStatus, WorkType, WorkerId};

fn work(session: &str, issue: &str, work_type: WorkType, priority: i64, at: u64) -> QueuedWork {
    QueuedWork {
        session_id: SessionId::new(session),
        issue_id: IssueId::new(issue),
        issue_identifier: format!("PROJ-{issue}"),
        priority,
        queued_at_ms: at,
        prompt: String::new(),
        provider_session_id: None,
        work_type,
        project: None,
    }
}

fn record(w: &QueuedWork) -> SessionRecord {
    SessionRecord {
        session_id: w.session_id.clone(),
        issue_id: w.issue_id.clone(),
        issue_identifier: w.issue_identifier.clone(),
        worker_id: None,
        work_type: w.work_type,
        status: SessionStatus::Pending,
        created_at_ms: w.queued_at_ms,
        updated_at_ms: w.queued_at_ms,
        queued_at_ms: Some(w.queued_at_ms),
        claimed_at_ms: None,
        worktree_path: None,
        provider_session_id: None,
        organization_id: None,
        priority: w.priority,
        prompt_context: None,
        total_cost_usd: None,
        input_tokens: None,
        output_tokens: None,
    }
}

/// Lock exclusivity: at most one lock per issue; the losing dispatch
/// never reaches the queue and shows up parked.
#[test]
fn conflicting_dispatch_parks_instead_of_queueing() {
    let s = spec();
    let first = work("sess-1", "I-1", WorkType::Development, 50, 1);
    assert!(s.store.dispatch(record(&first), first).dispatched);

    let second = work("sess-2", "I-1", WorkType::Qa, 30, 2);
    let outcome = s.store.dispatch(record(&second), second);
    assert!(!outcome.dispatched);
    assert!(outcome.parked);

    assert_eq!(s.store.queue_len(), 1);
    assert_eq!(s.store.queue_snapshot()[0].session_id, "sess-1");
    assert_eq!(s.store.get_issue_lock("I-1").unwrap().session_id, "sess-1");
}

/// Queue ordering: claims observe priority asc, then queued-at asc.
#[test]
fn claims_observe_priority_then_fifo() {
    let s = spec();
    for w in [
        work("sess-late-urgent", "I-1", WorkType::Inflight, 10, 9_000),
        work("sess-early", "I-2", WorkType::Development, 50, 1_000),
        work("sess-later", "I-3", WorkType::Development, 50, 2_000),
    ] {
        s.store.dispatch(record(&w), w);
    }

    let order: Vec<String> = s
        .store
        .queue_snapshot()
        .iter()
        .map(|w| w.session_id.as_str().to_string())
        .collect();
    assert_eq!(order, vec!["sess-late-urgent", "sess-early", "sess-later"]);

    // claiming drains in exactly that order
    let worker = WorkerId::new("wrk-1");
    for expected in order {
        match s.store.claim_session(&expected, &worker) {
            fm_store::ClaimOutcome::Claimed { work, .. } => {
                assert_eq!(work.session_id, expected.as_str())
            }
            other => panic!("claim failed: {other:?}"),
        }
    }
}

/// Parked replacement: one entry per (issue, work type); the newest wins
/// and the superseded session stops.
#[test]
fn parked_entries_replace_by_work_type() {
    let s = spec();
    let holder = work("sess-1", "I-1", WorkType::Development, 50, 1);
    s.store.dispatch(record(&holder), holder);

    let first_qa = work("sess-2", "I-1", WorkType::Qa, 30, 2);
    let outcome = s.store.dispatch(record(&first_qa), first_qa);
    assert!(outcome.parked && !outcome.replaced);

    let second_qa = work("sess-3", "I-1", WorkType::Qa, 30, 3);
    let outcome = s.store.dispatch(record(&second_qa), second_qa);
    assert!(outcome.parked && outcome.replaced);

    assert_eq!(s.store.get_session("sess-2").unwrap().status, SessionStatus::Stopped);

    // on release, only the latest QA intent promotes
    let stop = s.store.stop_session("sess-1");
    assert_eq!(stop.promoted.unwrap().session_id, "sess-3");
}

/// Dedup window boundary: a key is a duplicate strictly inside the
/// window and fresh at exactly the window edge.
#[test]
fn dedup_window_boundaries() {
    let s = spec();
    assert!(!s.store.is_duplicate("k", 10_000));
    s.clock.advance_ms(9_999);
    assert!(s.store.is_duplicate("k", 10_000));
    s.clock.advance_ms(1);
    // the first sighting's window just expired
    assert!(!s.store.is_duplicate("k", 10_000));
}
