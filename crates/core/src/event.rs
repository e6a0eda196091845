// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Governor events and the bus envelope.
//!
//! Serializes with `{"type": "scope:name", ...fields}` format.

use crate::issue::{Issue, IssueId, IssueStatus};
use crate::session::SessionId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    Webhook,
    Poll,
    Manual,
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Webhook => "webhook",
            Self::Poll => "poll",
            Self::Manual => "manual",
        };
        f.write_str(s)
    }
}

/// Outcome reported by a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionOutcome {
    Success,
    Failure,
}

impl SessionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Events the governor loop consumes.
///
/// Every variant carries the issue snapshot the decision will be made
/// against; the governor never re-fetches inside an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GovernorEvent {
    #[serde(rename = "issue:status-changed")]
    IssueStatusChanged {
        issue_id: IssueId,
        issue: Issue,
        /// Absent on webhook-normalized events (the raw payload carries
        /// only a state id). Informational; policy must not rely on it.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        previous_status: Option<IssueStatus>,
        new_status: IssueStatus,
        timestamp_ms: u64,
        source: EventSource,
    },

    #[serde(rename = "issue:comment-added")]
    CommentAdded {
        issue_id: IssueId,
        issue: Issue,
        comment_id: String,
        comment_body: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_name: Option<String>,
        timestamp_ms: u64,
        source: EventSource,
    },

    #[serde(rename = "session:completed")]
    SessionCompleted {
        issue_id: IssueId,
        issue: Issue,
        session_id: SessionId,
        outcome: SessionOutcome,
        timestamp_ms: u64,
        source: EventSource,
    },

    #[serde(rename = "issue:poll-snapshot")]
    PollSnapshot {
        issue_id: IssueId,
        issue: Issue,
        project: String,
        timestamp_ms: u64,
        source: EventSource,
    },
}

impl GovernorEvent {
    pub fn issue_id(&self) -> &IssueId {
        match self {
            Self::IssueStatusChanged { issue_id, .. }
            | Self::CommentAdded { issue_id, .. }
            | Self::SessionCompleted { issue_id, .. }
            | Self::PollSnapshot { issue_id, .. } => issue_id,
        }
    }

    pub fn issue(&self) -> &Issue {
        match self {
            Self::IssueStatusChanged { issue, .. }
            | Self::CommentAdded { issue, .. }
            | Self::SessionCompleted { issue, .. }
            | Self::PollSnapshot { issue, .. } => issue,
        }
    }

    pub fn source(&self) -> EventSource {
        match self {
            Self::IssueStatusChanged { source, .. }
            | Self::CommentAdded { source, .. }
            | Self::SessionCompleted { source, .. }
            | Self::PollSnapshot { source, .. } => *source,
        }
    }

    /// Canonical deduplication key.
    ///
    /// Poll snapshots share the status-event form so an unchanged issue
    /// seen by both a webhook and a sweep collapses to one evaluation.
    pub fn dedup_key(&self) -> String {
        match self {
            Self::IssueStatusChanged { issue_id, new_status, .. } => {
                format!("{}:{}", issue_id, new_status)
            }
            Self::CommentAdded { issue_id, comment_id, .. } => {
                format!("{}:comment:{}", issue_id, comment_id)
            }
            Self::SessionCompleted { session_id, timestamp_ms, .. } => {
                format!("{}:session-completed:{}", session_id, timestamp_ms)
            }
            Self::PollSnapshot { issue_id, issue, .. } => {
                format!("{}:{}", issue_id, issue.status)
            }
        }
    }
}

/// What the bus hands the subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: u64,
    pub event: GovernorEvent,
    /// True until the consumer acks.
    pub ack_pending: bool,
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
