// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-issue context gathered before every evaluation.

use fm_core::{Clock, Directive, Issue, OverridePriority, ProcessingPhase};
use fm_store::Store;

/// Everything the evaluator needs to know about one issue right now.
#[derive(Debug, Clone, Default)]
pub struct IssueContext {
    pub has_active_session: bool,
    pub is_within_cooldown: bool,
    pub is_parent: bool,
    pub is_held: bool,
    pub hold_reason: Option<String>,
    pub research_completed: bool,
    pub backlog_creation_completed: bool,
    /// Opaque per-session workflow strategy carried through to prompts.
    pub workflow_strategy: Option<String>,
    pub priority_override: Option<OverridePriority>,
    pub skip_qa: bool,
    pub decompose_requested: bool,
}

impl IssueContext {
    /// Gather context flags from the store.
    pub fn gather<C: Clock>(store: &Store<C>, issue: &Issue) -> Self {
        let issue_id = issue.id.as_str();
        let mut context = IssueContext {
            has_active_session: store.active_session_for_issue(issue_id).is_some(),
            is_within_cooldown: store.within_cooldown(issue_id),
            is_parent: store.is_known_parent(issue_id),
            research_completed: store.phase_completed(issue_id, ProcessingPhase::Research),
            backlog_creation_completed: store
                .phase_completed(issue_id, ProcessingPhase::BacklogCreation),
            // Opaque strategy carried on tracker labels, e.g. "workflow:tdd".
            workflow_strategy: issue
                .labels
                .iter()
                .find_map(|label| label.strip_prefix("workflow:").map(str::to_string)),
            ..Default::default()
        };
        if let Some(record) = store.get_override(issue_id) {
            match &record.directive {
                Directive::Hold { reason } => {
                    context.is_held = true;
                    context.hold_reason = reason.clone();
                }
                Directive::SkipQa => context.skip_qa = true,
                Directive::Decompose => context.decompose_requested = true,
                Directive::Priority { level } => context.priority_override = Some(*level),
                Directive::Resume | Directive::Reassign => {}
            }
        }
        context
    }
}
