// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixture for the spec suite.

use fm_core::{
    EventSource, GovernorConfig, GovernorEvent, Issue, IssueId, IssueStatus, ManualClock,
    SessionOutcome,
};
use fm_governor::{EventBus, FakeAdapter, Governor};
use fm_store::Store;
use std::sync::Arc;

pub struct Spec {
    pub governor: Governor<ManualClock>,
    pub clock: ManualClock,
    pub store: Arc<Store<ManualClock>>,
    pub adapter: Arc<FakeAdapter>,
    pub bus: EventBus,
}

pub fn spec() -> Spec {
    spec_with(GovernorConfig {
        projects: vec!["platform".to_string()],
        ..Default::default()
    })
}

pub fn spec_with(config: GovernorConfig) -> Spec {
    let clock = ManualClock::new();
    clock.set_epoch_ms(100 * 3_600_000);
    let store = Arc::new(Store::new(clock.clone()));
    let bus = EventBus::new();
    let adapter = Arc::new(FakeAdapter::new());
    let governor =
        Governor::new(config, clock.clone(), store.clone(), bus.clone(), adapter.clone());
    Spec { governor, clock, store, adapter, bus }
}

pub fn issue(id: &str, status: &str) -> Issue {
    Issue {
        id: IssueId::new(id),
        identifier: format!("PROJ-{id}"),
        title: "do the thing".to_string(),
        description: Some("Fix the thing.".to_string()),
        status: IssueStatus::new(status),
        labels: vec![],
        created_at_ms: 1_000,
        parent_id: None,
        project: Some("platform".to_string()),
    }
}

pub fn status_event(issue: Issue) -> GovernorEvent {
    GovernorEvent::IssueStatusChanged {
        issue_id: issue.id.clone(),
        new_status: issue.status.clone(),
        previous_status: None,
        issue,
        timestamp_ms: 1,
        source: EventSource::Webhook,
    }
}

pub fn comment_event(issue: Issue, comment_id: &str, body: &str) -> GovernorEvent {
    GovernorEvent::CommentAdded {
        issue_id: issue.id.clone(),
        issue,
        comment_id: comment_id.to_string(),
        comment_body: body.to_string(),
        user_id: Some("usr-1".to_string()),
        user_name: Some("Ada".to_string()),
        timestamp_ms: 1,
        source: EventSource::Webhook,
    }
}

pub fn completed_event(issue: Issue, session_id: &str, success: bool) -> GovernorEvent {
    GovernorEvent::SessionCompleted {
        issue_id: issue.id.clone(),
        issue,
        session_id: session_id.into(),
        outcome: if success { SessionOutcome::Success } else { SessionOutcome::Failure },
        timestamp_ms: 1,
        source: EventSource::Manual,
    }
}
