// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Platform adapter contract.
//!
//! The tracker client lives outside this crate; the governor sees it only
//! through this trait. Scans are single-RPC and pre-resolved (no N+1),
//! webhook normalization is pure, and status writes go through the API
//! mediator owned by the caller.

use async_trait::async_trait;
use fm_core::{
    EventSource, GovernorEvent, Issue, IssueId, IssueStatus, SessionEventKind, SessionId,
};
use fm_upstream::UpstreamError;
use std::collections::HashSet;

/// One-RPC project scan with child-count knowledge.
#[derive(Debug, Clone, Default)]
pub struct ProjectScan {
    pub issues: Vec<Issue>,
    /// Issues that have children (coordinated issues).
    pub parent_ids: HashSet<IssueId>,
}

/// What external platform adapters implement.
#[async_trait]
pub trait PlatformAdapter: Send + Sync + 'static {
    /// Map upstream webhook JSON into governor events. `None` for shapes
    /// this adapter does not recognize.
    fn normalize_webhook_event(&self, raw: &serde_json::Value) -> Option<Vec<GovernorEvent>>;

    /// All non-terminal issues of a project, pre-resolved.
    async fn scan_project_issues(&self, project: &str) -> Result<Vec<Issue>, UpstreamError>;

    /// Same plus which issues have children.
    async fn scan_project_issues_with_parents(
        &self,
        project: &str,
    ) -> Result<ProjectScan, UpstreamError>;

    /// Move an issue to a new workflow status upstream.
    async fn set_issue_status(
        &self,
        issue_id: &IssueId,
        status: &IssueStatus,
    ) -> Result<(), UpstreamError>;

    /// Forward worker-reported session telemetry upstream.
    async fn forward_session_event(
        &self,
        session_id: &SessionId,
        kind: SessionEventKind,
        payload: &serde_json::Value,
    ) -> Result<(), UpstreamError>;
}

/// Normalize the common tracker webhook shape.
///
/// Issue updates map to `issue-status-changed` only when
/// `updatedFrom.stateId` is present (the status actually moved). The raw
/// payload carries just a state id for the previous value, so
/// `previous_status` stays `None`; recovering it would cost an API call
/// per event.
pub fn normalize_tracker_webhook(
    raw: &serde_json::Value,
    timestamp_ms: u64,
) -> Option<Vec<GovernorEvent>> {
    let action = raw.get("action")?.as_str()?;
    let kind = raw.get("type")?.as_str()?;
    let data = raw.get("data")?;

    match (kind, action) {
        ("Issue", "update") => {
            // Only state moves matter; title/description edits are noise.
            raw.get("updatedFrom")?.get("stateId")?;
            let issue = issue_from_payload(data)?;
            Some(vec![GovernorEvent::IssueStatusChanged {
                issue_id: issue.id.clone(),
                new_status: issue.status.clone(),
                previous_status: None,
                issue,
                timestamp_ms,
                source: EventSource::Webhook,
            }])
        }
        ("Comment", "create") => {
            let issue = issue_from_payload(data.get("issue")?)?;
            let comment_id = data.get("id")?.as_str()?.to_string();
            let comment_body = data.get("body")?.as_str()?.to_string();
            let user = data.get("user");
            Some(vec![GovernorEvent::CommentAdded {
                issue_id: issue.id.clone(),
                issue,
                comment_id,
                comment_body,
                user_id: user
                    .and_then(|u| u.get("id"))
                    .and_then(|v| v.as_str())
                    .map(String::from),
                user_name: user
                    .and_then(|u| u.get("name"))
                    .and_then(|v| v.as_str())
                    .map(String::from),
                timestamp_ms,
                source: EventSource::Webhook,
            }])
        }
        _ => None,
    }
}

/// Build a governor issue from a webhook `data` payload.
fn issue_from_payload(data: &serde_json::Value) -> Option<Issue> {
    let id = data.get("id")?.as_str()?;
    let status = data
        .get("state")
        .and_then(|s| s.get("name"))
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    Some(Issue {
        id: IssueId::new(id),
        identifier: data
            .get("identifier")
            .and_then(|v| v.as_str())
            .unwrap_or(id)
            .to_string(),
        title: data.get("title").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
        description: data.get("description").and_then(|v| v.as_str()).map(String::from),
        status: IssueStatus::new(status),
        labels: data
            .get("labels")
            .and_then(|v| v.as_array())
            .map(|labels| {
                labels
                    .iter()
                    .filter_map(|l| {
                        l.as_str().map(String::from).or_else(|| {
                            l.get("name").and_then(|n| n.as_str()).map(String::from)
                        })
                    })
                    .collect()
            })
            .unwrap_or_default(),
        created_at_ms: data.get("createdAtMs").and_then(|v| v.as_u64()).unwrap_or(0),
        parent_id: data
            .get("parentId")
            .and_then(|v| v.as_str())
            .map(IssueId::new),
        project: data
            .get("project")
            .and_then(|p| p.get("name").or(Some(p)))
            .and_then(|v| v.as_str())
            .map(String::from),
    })
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    //! Recording adapter for tests.

    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// Canned-scan, call-recording platform adapter.
    #[derive(Default)]
    pub struct FakeAdapter {
        scans: Mutex<HashMap<String, ProjectScan>>,
        pub status_updates: Mutex<Vec<(IssueId, IssueStatus)>>,
        pub forwarded: Mutex<Vec<(SessionId, SessionEventKind)>>,
        /// Projects whose scans fail with a 500.
        pub fail_projects: Mutex<std::collections::HashSet<String>>,
    }

    impl FakeAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_scan(&self, project: &str, scan: ProjectScan) {
            self.scans.lock().insert(project.to_string(), scan);
        }

        pub fn status_update_count(&self) -> usize {
            self.status_updates.lock().len()
        }
    }

    #[async_trait]
    impl PlatformAdapter for FakeAdapter {
        fn normalize_webhook_event(
            &self,
            raw: &serde_json::Value,
        ) -> Option<Vec<GovernorEvent>> {
            normalize_tracker_webhook(raw, 0)
        }

        async fn scan_project_issues(&self, project: &str) -> Result<Vec<Issue>, UpstreamError> {
            Ok(self.scan_project_issues_with_parents(project).await?.issues)
        }

        async fn scan_project_issues_with_parents(
            &self,
            project: &str,
        ) -> Result<ProjectScan, UpstreamError> {
            if self.fail_projects.lock().contains(project) {
                return Err(UpstreamError::status(500, "scan failed"));
            }
            Ok(self.scans.lock().get(project).cloned().unwrap_or_default())
        }

        async fn set_issue_status(
            &self,
            issue_id: &IssueId,
            status: &IssueStatus,
        ) -> Result<(), UpstreamError> {
            self.status_updates.lock().push((issue_id.clone(), status.clone()));
            Ok(())
        }

        async fn forward_session_event(
            &self,
            session_id: &SessionId,
            kind: SessionEventKind,
            _payload: &serde_json::Value,
        ) -> Result<(), UpstreamError> {
            self.forwarded.lock().push((session_id.clone(), kind));
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "adapter_tests.rs"]
mod tests;
