// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Top-of-funnel processing phases.
//!
//! Research and backlog-creation each run at most once per issue; the
//! completion record keeps poll sweeps from re-triggering them.

use crate::issue::IssueId;
use crate::session::SessionId;
use crate::work::WorkType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase records expire after 30 days.
pub const PROCESSING_PHASE_TTL_MS: u64 = 30 * 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessingPhase {
    Research,
    BacklogCreation,
}

impl ProcessingPhase {
    /// The phase a completed work type marks, if any.
    pub fn for_work_type(work: WorkType) -> Option<Self> {
        match work {
            WorkType::Research => Some(Self::Research),
            WorkType::BacklogCreation => Some(Self::BacklogCreation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::BacklogCreation => "backlog-creation",
        }
    }
}

impl fmt::Display for ProcessingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marks a phase as completed for an issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingPhaseRecord {
    pub issue_id: IssueId,
    pub phase: ProcessingPhase,
    pub completed_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
}

impl ProcessingPhaseRecord {
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.completed_at_ms.saturating_add(PROCESSING_PHASE_TTL_MS)
    }
}
