// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Top-of-funnel policy: what to do with Icebox issues.

use fm_core::{Issue, TopOfFunnelConfig};

use crate::context::IssueContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TofActionKind {
    None,
    TriggerResearch,
    TriggerBacklogCreation,
}

/// Decision with a human-readable reason for the audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TofAction {
    pub kind: TofActionKind,
    pub reason: String,
}

impl TofAction {
    fn none(reason: impl Into<String>) -> Self {
        Self { kind: TofActionKind::None, reason: reason.into() }
    }
}

/// A description counts as researched when it is long enough and carries
/// at least one of the configured headers.
pub fn is_well_researched(description: &str, config: &TopOfFunnelConfig) -> bool {
    description.len() >= config.min_researched_description_length
        && config.researched_headers.iter().any(|header| description.contains(header.as_str()))
}

/// Research is owed to thin or explicitly flagged Icebox issues, once the
/// newborn delay has passed. Parents (issues with children) never funnel.
pub fn needs_research(
    issue: &Issue,
    config: &TopOfFunnelConfig,
    is_parent: bool,
    now_ms: u64,
) -> bool {
    if !issue.status.is_icebox() || is_parent {
        return false;
    }
    let flagged = config.research_request_labels.iter().any(|label| issue.has_label(label));
    let thin = !is_well_researched(issue.description_text(), config);
    let aged = now_ms.saturating_sub(issue.created_at_ms) >= config.icebox_research_delay_ms;
    (thin || flagged) && aged
}

/// Well-researched Icebox issues are ready to be decomposed into backlog.
pub fn is_ready_for_backlog_creation(
    issue: &Issue,
    config: &TopOfFunnelConfig,
    is_parent: bool,
) -> bool {
    issue.status.is_icebox()
        && !is_parent
        && is_well_researched(issue.description_text(), config)
}

/// The full top-of-funnel decision for one issue.
pub fn determine_top_of_funnel_action(
    issue: &Issue,
    config: &TopOfFunnelConfig,
    context: &IssueContext,
    now_ms: u64,
) -> TofAction {
    if !issue.status.is_icebox() {
        return TofAction::none(format!("status {} is past the funnel", issue.status));
    }
    if context.has_active_session {
        return TofAction::none("an agent session is already active");
    }
    if context.is_held {
        return TofAction::none("issue is held by operator directive");
    }
    if context.is_parent {
        return TofAction::none("parent issues are coordinated, not funneled");
    }

    if config.enable_auto_research
        && !context.research_completed
        && needs_research(issue, config, context.is_parent, now_ms)
    {
        let reason = if is_well_researched(issue.description_text(), config) {
            "research explicitly requested by label".to_string()
        } else {
            "description lacks sufficient detail for backlog creation".to_string()
        };
        return TofAction { kind: TofActionKind::TriggerResearch, reason };
    }

    if config.enable_auto_backlog_creation
        && !context.backlog_creation_completed
        && is_ready_for_backlog_creation(issue, config, context.is_parent)
    {
        return TofAction {
            kind: TofActionKind::TriggerBacklogCreation,
            reason: "description is well-researched and ready to decompose".to_string(),
        };
    }

    TofAction::none("no funnel work owed")
}

#[cfg(test)]
#[path = "funnel_tests.rs"]
mod tests;
