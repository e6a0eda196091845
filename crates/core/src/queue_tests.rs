// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::work::WorkType;
use std::cmp::Ordering;

fn work(session: &str, priority: i64, queued_at_ms: u64) -> QueuedWork {
    QueuedWork {
        session_id: SessionId::new(session),
        issue_id: IssueId::new("iss-1"),
        issue_identifier: "PROJ-1".to_string(),
        priority,
        queued_at_ms,
        prompt: String::new(),
        provider_session_id: None,
        work_type: WorkType::Development,
        project: None,
    }
}

#[test]
fn priority_dominates_enqueue_time() {
    let urgent = work("a", 10, 9_000);
    let routine = work("b", 50, 1_000);
    assert_eq!(urgent.queue_cmp(&routine), Ordering::Less);
}

#[test]
fn fifo_within_a_priority() {
    let first = work("a", 50, 1_000);
    let second = work("b", 50, 2_000);
    assert_eq!(first.queue_cmp(&second), Ordering::Less);
}

#[test]
fn session_id_breaks_full_ties() {
    let a = work("a", 50, 1_000);
    let b = work("b", 50, 1_000);
    assert_eq!(a.queue_cmp(&b), Ordering::Less);
    assert_eq!(b.queue_cmp(&a), Ordering::Greater);
}

#[test]
fn score_orders_like_queue_cmp() {
    let entries =
        [work("a", 10, 9_000), work("b", 50, 1_000), work("c", 50, 2_000), work("d", 20, 500)];
    for x in &entries {
        for y in &entries {
            if x.score() < y.score() {
                assert_eq!(x.queue_cmp(y), Ordering::Less, "{} vs {}", x.session_id, y.session_id);
            }
        }
    }
}
