// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session records and the session status lattice.
//!
//! A session is one agent run against one issue. Records are created at
//! dispatch time and mutated only by the worker API; statuses move strictly
//! forward and terminal statuses are absorbing.

use crate::issue::IssueId;
use crate::work::WorkType;
use crate::worker::WorkerId;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Session records are deleted this long after reaching a terminal status.
pub const SESSION_TTL_AFTER_TERMINAL_MS: u64 = 7 * 24 * 60 * 60 * 1000;

/// Issue locks lease for this long unless refreshed.
pub const ISSUE_LOCK_TTL_MS: u64 = 30 * 60 * 1000;

/// Prefix of session ids the governor synthesizes when the tracker did not
/// assign one. Worker operations on synthetic sessions are acked locally
/// and never forwarded upstream.
pub const SYNTHETIC_SESSION_PREFIX: &str = "governor-";

/// Identifier for an agent session, tracker-assigned or synthesized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Synthesize a `governor-<uuid>` id.
    pub fn synthetic() -> Self {
        Self(format!("{}{}", SYNTHETIC_SESSION_PREFIX, uuid::Uuid::new_v4()))
    }

    pub fn is_synthetic(&self) -> bool {
        self.0.starts_with(SYNTHETIC_SESSION_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for SessionId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for SessionId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Borrow<str> for SessionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Session lifecycle status.
///
/// The lattice is `pending → claimed → running → finalizing →
/// {completed | failed | stopped}`. Skipping forward is allowed (a worker
/// may fail a claimed session without ever running it); moving backward or
/// out of a terminal status is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Claimed,
    Running,
    Finalizing,
    Completed,
    Failed,
    Stopped,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Stopped)
    }

    /// Statuses that require a bound worker.
    pub fn requires_worker(&self) -> bool {
        matches!(self, Self::Claimed | Self::Running | Self::Finalizing)
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Claimed => 1,
            Self::Running => 2,
            Self::Finalizing => 3,
            Self::Completed | Self::Failed | Self::Stopped => 4,
        }
    }

    /// True when `next` is a legal strictly-forward move from `self`.
    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Claimed => "claimed",
            Self::Running => "running",
            Self::Finalizing => "finalizing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One agent run against one issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: SessionId,
    pub issue_id: IssueId,
    pub issue_identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<WorkerId>,
    pub work_type: WorkType,
    pub status: SessionStatus,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queued_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worktree_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    pub priority: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cost_usd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
}

impl SessionRecord {
    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }
}

/// Kinds of worker-reported session telemetry forwarded upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionEventKind {
    Activity,
    Progress,
    Completion,
    ExternalUrls,
    ToolError,
}

impl SessionEventKind {
    pub fn from_path(segment: &str) -> Option<Self> {
        match segment {
            "activity" => Some(Self::Activity),
            "progress" => Some(Self::Progress),
            "completion" => Some(Self::Completion),
            "external-urls" => Some(Self::ExternalUrls),
            "tool-error" => Some(Self::ToolError),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Activity => "activity",
            Self::Progress => "progress",
            Self::Completion => "completion",
            Self::ExternalUrls => "external-urls",
            Self::ToolError => "tool-error",
        }
    }
}

/// Exclusive per-issue lease held by a session from dispatch to release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueLock {
    pub issue_id: IssueId,
    pub session_id: SessionId,
    pub work_type: WorkType,
    pub acquired_at_ms: u64,
    pub ttl_ms: u64,
}

impl IssueLock {
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.acquired_at_ms.saturating_add(self.ttl_ms)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
