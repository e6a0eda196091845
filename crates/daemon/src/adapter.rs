// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Webhook-only platform adapter.
//!
//! Used when no tracker integration crate is linked in: webhook ingress
//! still normalizes and drives the governor, while scans return nothing
//! and outbound writes are logged and dropped. Deployments substitute a
//! real adapter through [`crate::lifecycle::run`].

use async_trait::async_trait;
use fm_core::{GovernorEvent, Issue, IssueId, IssueStatus, SessionEventKind, SessionId};
use fm_governor::{normalize_tracker_webhook, PlatformAdapter, ProjectScan};
use fm_upstream::UpstreamError;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Default)]
pub struct WebhookOnlyAdapter;

impl WebhookOnlyAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PlatformAdapter for WebhookOnlyAdapter {
    fn normalize_webhook_event(&self, raw: &serde_json::Value) -> Option<Vec<GovernorEvent>> {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        normalize_tracker_webhook(raw, now_ms)
    }

    async fn scan_project_issues(&self, _project: &str) -> Result<Vec<Issue>, UpstreamError> {
        Ok(Vec::new())
    }

    async fn scan_project_issues_with_parents(
        &self,
        _project: &str,
    ) -> Result<ProjectScan, UpstreamError> {
        Ok(ProjectScan::default())
    }

    async fn set_issue_status(
        &self,
        issue_id: &IssueId,
        status: &IssueStatus,
    ) -> Result<(), UpstreamError> {
        tracing::warn!(issue = %issue_id, %status, "no tracker adapter; status update dropped");
        Ok(())
    }

    async fn forward_session_event(
        &self,
        session_id: &SessionId,
        kind: SessionEventKind,
        _payload: &serde_json::Value,
    ) -> Result<(), UpstreamError> {
        tracing::debug!(session = %session_id, kind = kind.as_str(), "no tracker adapter; event dropped");
        Ok(())
    }
}
