// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Poll sweep behavior.

use super::*;
use crate::adapter::ProjectScan;
use fm_core::GovernorConfig;
use std::collections::HashSet;

fn two_project_config() -> GovernorConfig {
    GovernorConfig {
        projects: vec!["platform".to_string(), "mobile".to_string()],
        ..Default::default()
    }
}

#[tokio::test]
async fn sweep_publishes_one_snapshot_per_issue() {
    let ctx = setup_with(two_project_config());
    ctx.adapter.set_scan(
        "platform",
        ProjectScan {
            issues: vec![issue("iss-1", "Backlog"), issue("iss-2", "Started")],
            parent_ids: HashSet::new(),
        },
    );
    let published = ctx.governor.sweep_projects().await;
    assert_eq!(published, 2);
    assert_eq!(ctx.bus.pending_ack_count(), 2);
}

#[tokio::test]
async fn sweep_learns_parents_from_the_scan() {
    let ctx = setup();
    let mut parent_ids = HashSet::new();
    parent_ids.insert(fm_core::IssueId::new("iss-p"));
    ctx.adapter.set_scan(
        "platform",
        ProjectScan { issues: vec![issue("iss-p", "Finished")], parent_ids },
    );
    ctx.governor.sweep_projects().await;
    assert!(ctx.governor.store().is_known_parent("iss-p"));
}

#[tokio::test]
async fn sweep_skips_terminal_issues() {
    let ctx = setup();
    ctx.adapter.set_scan(
        "platform",
        ProjectScan {
            issues: vec![issue("iss-1", "Accepted"), issue("iss-2", "Backlog")],
            parent_ids: HashSet::new(),
        },
    );
    assert_eq!(ctx.governor.sweep_projects().await, 1);
}

#[tokio::test(start_paused = true)]
async fn one_failing_project_does_not_block_the_rest() {
    let ctx = setup_with(two_project_config());
    ctx.adapter.fail_projects.lock().insert("platform".to_string());
    ctx.adapter.set_scan(
        "mobile",
        ProjectScan { issues: vec![issue("iss-9", "Backlog")], parent_ids: HashSet::new() },
    );
    // platform's 500 is retried and logged; mobile still publishes
    assert_eq!(ctx.governor.sweep_projects().await, 1);
}

#[tokio::test]
async fn swept_snapshots_dedupe_against_webhook_events() {
    let ctx = setup();
    ctx.governor.handle_event(&status_event(issue("iss-1", "Backlog"))).await;
    assert_eq!(ctx.governor.store().queue_len(), 1);

    // a sweep snapshot of the unchanged issue collapses in the window
    let snapshot = fm_core::GovernorEvent::PollSnapshot {
        issue_id: "iss-1".into(),
        issue: issue("iss-1", "Backlog"),
        project: "platform".to_string(),
        timestamp_ms: 2,
        source: fm_core::EventSource::Poll,
    };
    let outcome = ctx.governor.handle_event(&snapshot).await;
    assert_eq!(outcome, crate::evaluate::EventOutcome::Duplicate);
    assert_eq!(ctx.governor.store().queue_len(), 1);
}
