// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work types and the status routing tables.
//!
//! A work type is the semantic role of an agent run on an issue, distinct
//! from the issue's workflow status. Derivation is a total function of
//! `(status, is_parent, prompt_hint)`; keyword hints can only select within
//! the status's valid set.

use crate::issue::IssueStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkType {
    Research,
    BacklogCreation,
    Development,
    Inflight,
    Qa,
    Acceptance,
    Refinement,
    Coordination,
    QaCoordination,
    AcceptanceCoordination,
}

impl WorkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::BacklogCreation => "backlog-creation",
            Self::Development => "development",
            Self::Inflight => "inflight",
            Self::Qa => "qa",
            Self::Acceptance => "acceptance",
            Self::Refinement => "refinement",
            Self::Coordination => "coordination",
            Self::QaCoordination => "qa-coordination",
            Self::AcceptanceCoordination => "acceptance-coordination",
        }
    }

    /// Coordination variants run against parent issues only.
    pub fn is_coordination(&self) -> bool {
        matches!(self, Self::Coordination | Self::QaCoordination | Self::AcceptanceCoordination)
    }

    pub fn is_qa(&self) -> bool {
        matches!(self, Self::Qa | Self::QaCoordination)
    }

    /// Default queue priority for this work type (lower = earlier).
    ///
    /// Inflight work resumes an interrupted session and goes first;
    /// acceptance and QA close loops before new development opens them.
    pub fn default_priority(&self) -> i64 {
        match self {
            Self::Inflight => 10,
            Self::Acceptance | Self::AcceptanceCoordination => 20,
            Self::Qa | Self::QaCoordination => 30,
            Self::Refinement => 40,
            Self::BacklogCreation => 45,
            Self::Development | Self::Coordination => 50,
            Self::Research => 60,
        }
    }

    /// All variants, for table-driven config defaults and tests.
    pub fn all() -> &'static [WorkType] {
        &[
            Self::Research,
            Self::BacklogCreation,
            Self::Development,
            Self::Inflight,
            Self::Qa,
            Self::Acceptance,
            Self::Refinement,
            Self::Coordination,
            Self::QaCoordination,
            Self::AcceptanceCoordination,
        ]
    }
}

impl fmt::Display for WorkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base work type for a status before keyword refinement.
///
/// Returns `None` for terminal statuses and for Icebox, which is routed by
/// the top-of-funnel policy instead.
pub fn base_work_type(status: &IssueStatus, is_parent: bool) -> Option<WorkType> {
    let work = match status.as_str() {
        IssueStatus::BACKLOG => {
            if is_parent {
                WorkType::Coordination
            } else {
                WorkType::Development
            }
        }
        IssueStatus::STARTED => WorkType::Inflight,
        IssueStatus::FINISHED => {
            if is_parent {
                WorkType::QaCoordination
            } else {
                WorkType::Qa
            }
        }
        IssueStatus::DELIVERED => {
            if is_parent {
                WorkType::AcceptanceCoordination
            } else {
                WorkType::Acceptance
            }
        }
        IssueStatus::REJECTED => WorkType::Refinement,
        _ => return None,
    };
    Some(work)
}

/// Work types a status may legally carry.
pub fn valid_work_types(status: &IssueStatus) -> &'static [WorkType] {
    match status.as_str() {
        IssueStatus::ICEBOX => &[WorkType::Research, WorkType::BacklogCreation],
        IssueStatus::BACKLOG => &[WorkType::Development, WorkType::Coordination],
        IssueStatus::STARTED => &[WorkType::Inflight],
        IssueStatus::FINISHED => &[WorkType::Qa, WorkType::QaCoordination],
        IssueStatus::DELIVERED => &[WorkType::Acceptance, WorkType::AcceptanceCoordination],
        IssueStatus::REJECTED => &[WorkType::Refinement],
        _ => &[],
    }
}

/// Map a free-text prompt hint to a work type keyword, if any.
fn hint_work_type(hint: &str) -> Option<WorkType> {
    let hint = hint.to_lowercase();
    // Longest keywords first so "qa-coordination" is not read as "qa".
    const KEYWORDS: &[(&str, WorkType)] = &[
        ("acceptance-coordination", WorkType::AcceptanceCoordination),
        ("qa-coordination", WorkType::QaCoordination),
        ("backlog-creation", WorkType::BacklogCreation),
        ("coordination", WorkType::Coordination),
        ("decompose", WorkType::BacklogCreation),
        ("development", WorkType::Development),
        ("acceptance", WorkType::Acceptance),
        ("refinement", WorkType::Refinement),
        ("research", WorkType::Research),
        ("inflight", WorkType::Inflight),
        ("refine", WorkType::Refinement),
        ("qa", WorkType::Qa),
    ];
    KEYWORDS.iter().find(|(kw, _)| hint.contains(kw)).map(|(_, work)| *work)
}

/// Derive the work type for `(status, is_parent, prompt_hint)`.
///
/// A keyword hint overrides the base derivation only when the hinted type
/// is valid for the status; otherwise the hint is ignored.
pub fn derive_work_type(
    status: &IssueStatus,
    is_parent: bool,
    prompt_hint: Option<&str>,
) -> Option<WorkType> {
    let base = base_work_type(status, is_parent)?;
    if let Some(hinted) = prompt_hint.and_then(hint_work_type) {
        if valid_work_types(status).contains(&hinted) {
            return Some(hinted);
        }
    }
    Some(base)
}

/// Issue status to set upstream when a session reaches a terminal outcome.
///
/// Returns `None` when the outcome implies no transition (e.g. failed
/// development work leaves the issue where it was).
pub fn completion_transition(work: WorkType, success: bool) -> Option<&'static str> {
    if success {
        let next = match work {
            WorkType::Development | WorkType::Inflight | WorkType::Coordination => {
                IssueStatus::FINISHED
            }
            WorkType::Qa | WorkType::QaCoordination => IssueStatus::DELIVERED,
            WorkType::Acceptance | WorkType::AcceptanceCoordination => IssueStatus::ACCEPTED,
            WorkType::Refinement => IssueStatus::BACKLOG,
            WorkType::Research | WorkType::BacklogCreation => return None,
        };
        Some(next)
    } else {
        match work {
            WorkType::Qa
            | WorkType::Acceptance
            | WorkType::QaCoordination
            | WorkType::AcceptanceCoordination => Some(IssueStatus::REJECTED),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "work_tests.rs"]
mod tests;
