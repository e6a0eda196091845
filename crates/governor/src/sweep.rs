// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Poll sweep: reconcile tracker state that webhooks missed.

use fm_core::{Clock, EventSource, GovernorEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::runtime::Governor;

impl<C: Clock> Governor<C> {
    /// One sweep over every configured project. Each issue becomes a
    /// `poll-snapshot` event; the dedup window keeps unchanged issues from
    /// re-evaluating. A failing project never blocks the rest.
    pub async fn sweep_projects(&self) -> usize {
        let mut published = 0;
        for project in &self.config().projects {
            let adapter = self.adapter();
            let scan = self
                .mediator()
                .call("scan_project_issues_with_parents", || {
                    let adapter = adapter.clone();
                    let project = project.clone();
                    async move { adapter.scan_project_issues_with_parents(&project).await }
                })
                .await;
            let scan = match scan {
                Ok(scan) => scan,
                Err(err) => {
                    tracing::warn!(project, error = %err, "project scan failed");
                    continue;
                }
            };

            self.store()
                .mark_parents(scan.parent_ids.iter().map(|id| id.as_str().to_string()));

            let now = self.clock().epoch_ms();
            for issue in scan.issues {
                if issue.status.is_terminal() {
                    continue;
                }
                let event = GovernorEvent::PollSnapshot {
                    issue_id: issue.id.clone(),
                    issue,
                    project: project.clone(),
                    timestamp_ms: now,
                    source: EventSource::Poll,
                };
                match self.bus().publish(event) {
                    Ok(_) => published += 1,
                    Err(err) => {
                        tracing::warn!(project, error = %err, "publish failed, bus closing");
                        return published;
                    }
                }
            }
        }
        published
    }
}

/// Timer task driving periodic sweeps. Off unless polling is enabled and
/// an interval is configured.
pub async fn run_poll_sweep<C: Clock>(governor: Arc<Governor<C>>, cancel: CancellationToken) {
    let Some(interval_ms) = governor.config().poll_interval_ms else {
        return;
    };
    if !governor.config().enable_polling {
        return;
    }
    let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = ticker.tick() => {
                let published = governor.sweep_projects().await;
                tracing::debug!(published, "poll sweep tick");
            }
        }
    }
}
