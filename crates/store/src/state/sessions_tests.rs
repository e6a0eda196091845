// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::state::test_support::{record, store, work};
use fm_core::{SessionStatus, WorkType, WorkerId, SESSION_TTL_AFTER_TERMINAL_MS};

#[test]
fn active_session_lookup_skips_terminal() {
    let s = store();
    let w = work("sess-1", "iss-1", WorkType::Development, 50);
    s.dispatch(record(&w, 0), w);
    assert!(s.active_session_for_issue("iss-1").is_some());

    let worker = WorkerId::new("wrk-1");
    s.claim_session("sess-1", &worker);
    s.update_session_status(
        "sess-1",
        &worker,
        SessionStatus::Completed,
        crate::StatusPatch::default(),
    );
    assert!(s.active_session_for_issue("iss-1").is_none());
}

#[test]
fn terminal_sessions_expire_after_ttl() {
    let s = store();
    let w = work("sess-1", "iss-1", WorkType::Development, 50);
    s.dispatch(record(&w, 0), w);
    let worker = WorkerId::new("wrk-1");
    s.claim_session("sess-1", &worker);
    s.update_session_status(
        "sess-1",
        &worker,
        SessionStatus::Completed,
        crate::StatusPatch::default(),
    );

    s.clock().advance_ms(SESSION_TTL_AFTER_TERMINAL_MS - 1);
    s.sweep_expired();
    assert!(s.get_session("sess-1").is_some());

    s.clock().advance_ms(2);
    s.sweep_expired();
    assert!(s.get_session("sess-1").is_none());
}

#[test]
fn cooldown_lapses_with_the_clock() {
    let s = store();
    let w = work("sess-1", "iss-1", WorkType::Development, 50);
    s.dispatch(record(&w, 0), w);
    let worker = WorkerId::new("wrk-1");
    s.claim_session("sess-1", &worker);
    s.update_session_status(
        "sess-1",
        &worker,
        SessionStatus::Completed,
        crate::StatusPatch::default(),
    );
    s.finalize_session("sess-1", true, 5_000);

    assert!(s.within_cooldown("iss-1"));
    s.clock().advance_ms(5_001);
    assert!(!s.within_cooldown("iss-1"));
}

#[test]
fn parent_knowledge_accumulates() {
    let s = store();
    assert!(!s.is_known_parent("iss-p"));
    s.mark_parent("iss-p");
    assert!(s.is_known_parent("iss-p"));
    s.mark_parents(vec!["iss-q".to_string(), "iss-r".to_string()]);
    assert!(s.is_known_parent("iss-q"));
}

#[test]
fn status_counts_for_stats() {
    let s = store();
    for (session, issue) in [("sess-1", "iss-1"), ("sess-2", "iss-2")] {
        let w = work(session, issue, WorkType::Development, 50);
        s.dispatch(record(&w, 0), w);
    }
    s.claim_session("sess-1", &WorkerId::new("wrk-1"));
    let counts = s.sessions_by_status();
    assert_eq!(counts.get(&SessionStatus::Pending), Some(&1));
    assert_eq!(counts.get(&SessionStatus::Claimed), Some(&1));
}
