// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hold/resume and directive recency specs.

use super::prelude::*;
use fm_core::{find_latest_override, Directive, IssueComment};
use fm_governor::EventOutcome;

/// `HOLD` stores the override and suppresses dispatch; a later `RESUME`
/// clears it and immediately re-evaluates, dispatching development for a
/// Backlog issue with no active session.
#[tokio::test]
async fn hold_then_resume_redispatches() {
    let s = spec();
    s.governor
        .handle_event(&comment_event(issue("I-1", "Backlog"), "c-1", "HOLD"))
        .await;
    assert!(s.store.get_override("I-1").is_some());

    let outcome = s.governor.handle_event(&status_event(issue("I-1", "Backlog"))).await;
    assert!(matches!(outcome, EventOutcome::Dropped { .. }));
    assert_eq!(s.store.queue_len(), 0);

    let outcome = s
        .governor
        .handle_event(&comment_event(issue("I-1", "Backlog"), "c-2", "RESUME"))
        .await;
    match outcome {
        EventOutcome::OverrideApplied { directive: "resume", followup: Some(followup) } => {
            assert!(matches!(*followup, EventOutcome::Dispatched { .. }))
        }
        other => panic!("expected resume, got {other:?}"),
    }
    assert!(s.store.get_override("I-1").is_none());
    assert_eq!(s.store.queue_len(), 1);
}

fn comment(id: &str, body: &str, at: u64, bot: bool) -> IssueComment {
    IssueComment {
        id: id.to_string(),
        body: body.to_string(),
        user_id: Some("usr".to_string()),
        user_name: None,
        is_bot: bot,
        created_at_ms: at,
    }
}

/// Directive recency: latest non-bot directive wins; ties break by
/// comment id.
#[test]
fn latest_nonbot_directive_wins() {
    let comments = vec![
        comment("c1", "HOLD - first", 100, false),
        comment("c2", "looks good!", 150, false),
        comment("c3", "RESUME", 200, false),
        comment("c4", "HOLD - from a bot", 900, true),
    ];
    let latest = find_latest_override(&comments).unwrap();
    assert_eq!(latest.directive, Directive::Resume);
    assert_eq!(latest.comment_id, "c3");

    let tied = vec![comment("a", "HOLD", 500, false), comment("b", "RESUME", 500, false)];
    assert_eq!(find_latest_override(&tied).unwrap().comment_id, "b");
}

/// First-line rule: a directive below conversation text never fires; a
/// dash-separated reason is captured.
#[test]
fn directive_must_lead_the_comment() {
    assert_eq!(fm_core::parse_directive("Great work!\nHOLD"), None);
    assert_eq!(
        fm_core::parse_directive("HOLD — reason"),
        Some(Directive::Hold { reason: Some("reason".to_string()) })
    );
}
