// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queued work entries and their global ordering.

use crate::issue::IssueId;
use crate::session::SessionId;
use crate::work::WorkType;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A unit of dispatched work waiting for a worker claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedWork {
    pub session_id: SessionId,
    pub issue_id: IssueId,
    pub issue_identifier: String,
    /// Lower sorts earlier.
    pub priority: i64,
    pub queued_at_ms: u64,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_session_id: Option<String>,
    pub work_type: WorkType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

impl QueuedWork {
    /// Sorted-set score: priority-major, enqueue-time-minor.
    ///
    /// `10^13` ms headroom keeps the two components from colliding for any
    /// realistic epoch timestamp.
    pub fn score(&self) -> i128 {
        self.priority as i128 * 10_000_000_000_000i128 + self.queued_at_ms as i128
    }

    /// Queue ordering: priority asc, then FIFO within a priority.
    ///
    /// Session id is the final tiebreak so ordering is total and stable
    /// across processes.
    pub fn queue_cmp(&self, other: &QueuedWork) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then(self.queued_at_ms.cmp(&other.queued_at_ms))
            .then_with(|| self.session_id.as_str().cmp(other.session_id.as_str()))
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "queue_property_tests.rs"]
mod property_tests;
