// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-event issue evaluation pipeline.
//!
//! Pure decision logic: override gate → terminal gate → funnel or work
//! type derivation → keyword refinement → busy/cooldown gate → priority.
//! Acting on the decision (queueing, parking) is the dispatcher's job.

use fm_core::{work, GovernorConfig, Issue, SessionId, WorkType};
use serde::Serialize;

use crate::context::IssueContext;
use crate::funnel::{determine_top_of_funnel_action, TofActionKind};

/// What the governor decided to do for an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentAction {
    TriggerResearch,
    TriggerBacklogCreation,
    TriggerDevelopment,
    TriggerQa,
    TriggerAcceptance,
    TriggerRefinement,
}

impl AgentAction {
    pub fn from_work_type(work: WorkType) -> Self {
        match work {
            WorkType::Research => Self::TriggerResearch,
            WorkType::BacklogCreation => Self::TriggerBacklogCreation,
            WorkType::Development | WorkType::Inflight | WorkType::Coordination => {
                Self::TriggerDevelopment
            }
            WorkType::Qa | WorkType::QaCoordination => Self::TriggerQa,
            WorkType::Acceptance | WorkType::AcceptanceCoordination => Self::TriggerAcceptance,
            WorkType::Refinement => Self::TriggerRefinement,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TriggerResearch => "trigger-research",
            Self::TriggerBacklogCreation => "trigger-backlog-creation",
            Self::TriggerDevelopment => "trigger-development",
            Self::TriggerQa => "trigger-qa",
            Self::TriggerAcceptance => "trigger-acceptance",
            Self::TriggerRefinement => "trigger-refinement",
        }
    }
}

/// Outcome of evaluating one issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    Drop { reason: String },
    Dispatch { work_type: WorkType, action: AgentAction, priority: i64, reason: String },
}

impl Evaluation {
    fn drop(reason: impl Into<String>) -> Self {
        Self::Drop { reason: reason.into() }
    }
}

/// Run the evaluation pipeline for one issue snapshot.
pub fn evaluate_issue(
    issue: &Issue,
    context: &IssueContext,
    config: &GovernorConfig,
    prompt_hint: Option<&str>,
    now_ms: u64,
) -> Evaluation {
    // Override gate first: a held issue dispatches nothing.
    if context.is_held {
        let reason = context.hold_reason.clone().unwrap_or_else(|| "held by operator".to_string());
        return Evaluation::drop(format!("held: {reason}"));
    }

    if issue.status.is_terminal() {
        return Evaluation::drop(format!("status {} is terminal", issue.status));
    }

    // Icebox issues belong to the funnel, not the status table.
    if issue.status.is_icebox() {
        let action =
            determine_top_of_funnel_action(issue, &config.top_of_funnel, context, now_ms);
        let (work_type, agent_action) = match action.kind {
            TofActionKind::None => return Evaluation::drop(action.reason),
            TofActionKind::TriggerResearch => (WorkType::Research, AgentAction::TriggerResearch),
            TofActionKind::TriggerBacklogCreation => {
                (WorkType::BacklogCreation, AgentAction::TriggerBacklogCreation)
            }
        };
        if context.has_active_session {
            return Evaluation::drop("an agent session is already active");
        }
        if context.is_within_cooldown {
            return Evaluation::drop("issue is cooling down after a recent session");
        }
        return Evaluation::Dispatch {
            work_type,
            action: agent_action,
            priority: priority_for(work_type, context, config),
            reason: action.reason,
        };
    }

    let Some(work_type) = work::derive_work_type(&issue.status, context.is_parent, prompt_hint)
    else {
        return Evaluation::drop(format!("status {} produces no work", issue.status));
    };

    if context.skip_qa && work_type.is_qa() {
        return Evaluation::drop("qa suppressed by skip-qa directive");
    }
    if context.has_active_session {
        return Evaluation::drop("an agent session is already active");
    }
    if context.is_within_cooldown {
        return Evaluation::drop("issue is cooling down after a recent session");
    }

    Evaluation::Dispatch {
        work_type,
        action: AgentAction::from_work_type(work_type),
        priority: priority_for(work_type, context, config),
        reason: format!("status {} derives {}", issue.status, work_type),
    }
}

fn priority_for(work_type: WorkType, context: &IssueContext, config: &GovernorConfig) -> i64 {
    match context.priority_override {
        Some(level) => level.queue_priority(),
        None => config.priority_for(work_type),
    }
}

/// Build the briefing prompt for a dispatched session.
pub fn build_prompt(work_type: WorkType, issue: &Issue, context: &IssueContext) -> String {
    let mut prompt = match work_type {
        WorkType::Research => format!(
            "Research issue {}: \"{}\". Produce a description with acceptance criteria and a technical approach.",
            issue.identifier, issue.title
        ),
        WorkType::BacklogCreation => format!(
            "Decompose issue {}: \"{}\" into backlog sub-issues with clear scopes.",
            issue.identifier, issue.title
        ),
        WorkType::Development | WorkType::Inflight => {
            format!("Implement issue {}: \"{}\".", issue.identifier, issue.title)
        }
        WorkType::Qa | WorkType::QaCoordination => {
            format!("Verify the finished work on issue {}: \"{}\".", issue.identifier, issue.title)
        }
        WorkType::Acceptance | WorkType::AcceptanceCoordination => {
            format!("Run acceptance on issue {}: \"{}\".", issue.identifier, issue.title)
        }
        WorkType::Refinement => format!(
            "Issue {} was rejected. Rework it: \"{}\".",
            issue.identifier, issue.title
        ),
        WorkType::Coordination => format!(
            "Coordinate the child issues of {}: \"{}\".",
            issue.identifier, issue.title
        ),
    };
    if context.decompose_requested && work_type == WorkType::Refinement {
        prompt.push_str(" Split it into smaller sub-issues as requested.");
    }
    if let Some(strategy) = &context.workflow_strategy {
        prompt.push_str(&format!(" Workflow strategy: {strategy}."));
    }
    prompt
}

/// What handling one bus event produced, for logging and tests.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// Work was dispatched (or parked behind the issue lock).
    Dispatched { action: AgentAction, session_id: SessionId, parked: bool },
    /// Nothing to do; the reason is logged.
    Dropped { reason: String },
    /// Duplicate within the dedup window.
    Duplicate,
    /// A comment directive was stored/cleared; `followup` carries the
    /// immediate re-evaluation outcome where one ran.
    OverrideApplied { directive: &'static str, followup: Option<Box<EventOutcome>> },
    /// Comment routed to a live session's prompt side-channel.
    PromptStored { session_id: SessionId },
    /// Terminal session handled: lock released, parked work promoted.
    Finalized { promoted: Option<SessionId> },
}

#[cfg(test)]
#[path = "evaluate_tests.rs"]
mod tests;
