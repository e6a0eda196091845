// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Acting on evaluations: queueing, parking, terminal handling.

use fm_core::{
    work, Clock, EventSource, GovernorEvent, Issue, IssueStatus, QueuedWork, SessionId,
    SessionOutcome, SessionRecord, SessionStatus, WorkType,
};

use crate::context::IssueContext;
use crate::evaluate::{build_prompt, AgentAction, EventOutcome};
use crate::runtime::Governor;

impl<C: Clock> Governor<C> {
    /// Turn a dispatch decision into a queued (or parked) session.
    pub(crate) fn dispatch_work(
        &self,
        issue: &Issue,
        context: &IssueContext,
        work_type: WorkType,
        action: AgentAction,
        priority: i64,
    ) -> EventOutcome {
        let now = self.clock().epoch_ms();
        let session_id = SessionId::synthetic();
        let prompt = build_prompt(work_type, issue, context);

        let queued = QueuedWork {
            session_id: session_id.clone(),
            issue_id: issue.id.clone(),
            issue_identifier: issue.identifier.clone(),
            priority,
            queued_at_ms: now,
            prompt: prompt.clone(),
            provider_session_id: None,
            work_type,
            project: issue.project.clone(),
        };
        let record = SessionRecord {
            session_id: session_id.clone(),
            issue_id: issue.id.clone(),
            issue_identifier: issue.identifier.clone(),
            worker_id: None,
            work_type,
            status: SessionStatus::Pending,
            created_at_ms: now,
            updated_at_ms: now,
            queued_at_ms: Some(now),
            claimed_at_ms: None,
            worktree_path: None,
            provider_session_id: None,
            organization_id: None,
            priority,
            prompt_context: Some(prompt),
            total_cost_usd: None,
            input_tokens: None,
            output_tokens: None,
        };

        let outcome = self.store().dispatch(record, queued);
        if outcome.dispatched {
            tracing::info!(
                issue = %issue.id,
                session = %session_id,
                work_type = %work_type,
                action = action.as_str(),
                "dispatched work"
            );
        } else {
            tracing::info!(
                issue = %issue.id,
                session = %session_id,
                work_type = %work_type,
                replaced = outcome.replaced,
                "issue locked, parked work"
            );
        }
        EventOutcome::Dispatched { action, session_id, parked: outcome.parked }
    }

    /// Handle a session reaching a terminal outcome: release and promote,
    /// then drive the completion-status transition upstream.
    pub(crate) async fn handle_session_completed(
        &self,
        session_id: &SessionId,
        outcome: SessionOutcome,
    ) -> EventOutcome {
        let Some(record) = self.store().get_session(session_id.as_str()) else {
            return EventOutcome::Dropped { reason: format!("unknown session {session_id}") };
        };

        let finalize = self.store().finalize_session(
            session_id.as_str(),
            outcome.is_success(),
            self.config().cooldown_ms,
        );
        if let Some(phase) = finalize.phase_marked {
            tracing::info!(issue = %record.issue_id, %phase, "processing phase completed");
        }
        if !finalize.finalized {
            // A duplicate completion past the dedup window; everything was
            // already released and transitioned.
            return EventOutcome::Finalized { promoted: None };
        }

        if let Some(next_status) = work::completion_transition(record.work_type, outcome.is_success())
        {
            let status = IssueStatus::new(next_status);
            let adapter = self.adapter();
            let issue_id = record.issue_id.clone();
            let result = self
                .mediator()
                .call("set_issue_status", || {
                    let adapter = adapter.clone();
                    let issue_id = issue_id.clone();
                    let status = status.clone();
                    async move { adapter.set_issue_status(&issue_id, &status).await }
                })
                .await;
            if let Err(err) = result {
                // The poll sweep reconciles the miss; the event still acks.
                tracing::warn!(
                    issue = %record.issue_id,
                    error = %err,
                    "completion transition failed"
                );
            }
        }

        let promoted = finalize.promoted.map(|w| w.session_id);
        if let Some(next) = &promoted {
            tracing::info!(issue = %record.issue_id, session = %next, "promoted parked work");
        }
        EventOutcome::Finalized { promoted }
    }

    /// Worker-reported terminal statuses publish a completion event so the
    /// governor loop finalizes exactly once, whichever side saw it first.
    pub fn publish_session_terminal(
        &self,
        record: &SessionRecord,
        status: SessionStatus,
    ) -> Result<u64, crate::error::GovernorError> {
        let outcome = match status {
            SessionStatus::Completed => SessionOutcome::Success,
            _ => SessionOutcome::Failure,
        };
        // Snapshot stub: finalization needs only ids and the outcome.
        let issue = Issue {
            id: record.issue_id.clone(),
            identifier: record.issue_identifier.clone(),
            title: String::new(),
            description: None,
            status: IssueStatus::new(""),
            labels: vec![],
            created_at_ms: record.created_at_ms,
            parent_id: None,
            project: None,
        };
        self.bus()
            .publish(GovernorEvent::SessionCompleted {
                issue_id: record.issue_id.clone(),
                issue,
                session_id: record.session_id.clone(),
                outcome,
                timestamp_ms: self.clock().epoch_ms(),
                source: EventSource::Manual,
            })
            .map_err(|_| crate::error::GovernorError::BusClosed)
    }
}
