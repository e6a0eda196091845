// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    bare_hold = { "HOLD", Directive::Hold { reason: None } },
    lowercase = { "hold", Directive::Hold { reason: None } },
    hyphen_reason = { "HOLD - waiting on design", Directive::Hold { reason: Some("waiting on design".to_string()) } },
    en_dash = { "HOLD – blocked", Directive::Hold { reason: Some("blocked".to_string()) } },
    em_dash = { "HOLD — reason", Directive::Hold { reason: Some("reason".to_string()) } },
    resume = { "RESUME", Directive::Resume },
    resume_trailing = { "resume please", Directive::Resume },
    skip_qa_space = { "SKIP QA", Directive::SkipQa },
    skip_qa_dash = { "skip-qa", Directive::SkipQa },
    skip_qa_loose = { "Skip  -  QA", Directive::SkipQa },
    decompose = { "DECOMPOSE", Directive::Decompose },
    reassign = { "Reassign", Directive::Reassign },
    priority_high = { "PRIORITY: high", Directive::Priority { level: OverridePriority::High } },
    priority_low = { "priority:low", Directive::Priority { level: OverridePriority::Low } },
    priority_spaced = { "Priority : medium", Directive::Priority { level: OverridePriority::Medium } },
)]
fn recognized_directives(body: &str, expected: Directive) {
    assert_eq!(parse_directive(body), Some(expected));
}

#[parameterized(
    conversation = { "Great work on this!" },
    buried_hold = { "Great work!\nHOLD" },
    holder = { "holder of the lock" },
    resumed_word = { "resumed yesterday" },
    unknown_priority = { "PRIORITY: urgent" },
    priority_missing_colon = { "PRIORITY high" },
    empty = { "" },
    whitespace = { "  \n\t  " },
    skip_alone = { "skip this one" },
)]
fn unrecognized_bodies(body: &str) {
    assert_eq!(parse_directive(body), None);
}

#[test]
fn first_nonempty_line_wins() {
    assert_eq!(
        parse_directive("\n\n  HOLD - top line\nRESUME"),
        Some(Directive::Hold { reason: Some("top line".to_string()) })
    );
}

#[test]
fn hold_reason_requires_a_dash() {
    // Trailing text without a dash is not a reason.
    assert_eq!(parse_directive("HOLD everything"), Some(Directive::Hold { reason: None }));
}

fn comment(id: &str, body: &str, created_at_ms: u64, is_bot: bool) -> IssueComment {
    IssueComment {
        id: id.to_string(),
        body: body.to_string(),
        user_id: Some("usr-1".to_string()),
        user_name: None,
        is_bot,
        created_at_ms,
    }
}

#[test]
fn latest_override_prefers_recency() {
    let comments = vec![
        comment("c1", "HOLD", 100, false),
        comment("c2", "nice!", 200, false),
        comment("c3", "RESUME", 300, false),
    ];
    let found = find_latest_override(&comments).unwrap();
    assert_eq!(found.directive, Directive::Resume);
    assert_eq!(found.comment_id, "c3");
}

#[test]
fn latest_override_ignores_bots() {
    let comments = vec![
        comment("c1", "HOLD", 100, false),
        comment("c2", "RESUME", 500, true),
    ];
    let found = find_latest_override(&comments).unwrap();
    assert_eq!(found.directive, Directive::Hold { reason: None });
}

#[test]
fn latest_override_ties_break_by_comment_id() {
    let comments = vec![
        comment("c1", "HOLD", 100, false),
        comment("c2", "RESUME", 100, false),
    ];
    let found = find_latest_override(&comments).unwrap();
    assert_eq!(found.comment_id, "c2");
}

#[test]
fn no_override_in_plain_conversation() {
    let comments = vec![comment("c1", "looks good", 100, false)];
    assert!(find_latest_override(&comments).is_none());
}

#[test]
fn priority_levels_map_to_queue_priorities() {
    assert!(OverridePriority::High.queue_priority() < OverridePriority::Medium.queue_priority());
    assert!(OverridePriority::Medium.queue_priority() < OverridePriority::Low.queue_priority());
}
