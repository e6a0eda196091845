// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Governor view of an upstream tracker issue.
//!
//! Statuses are opaque tracker text; the governor only distinguishes the
//! terminal set and the well-known workflow names it routes on.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Stable opaque identifier assigned by the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssueId(pub String);

impl IssueId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for IssueId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for IssueId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for IssueId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for IssueId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Borrow<str> for IssueId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Workflow status as reported by the tracker.
///
/// Carried as opaque text; helpers below interpret the workflow names the
/// governor routes on. Unknown statuses are treated as active.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueStatus(pub String);

impl IssueStatus {
    pub const ICEBOX: &'static str = "Icebox";
    pub const BACKLOG: &'static str = "Backlog";
    pub const STARTED: &'static str = "Started";
    pub const FINISHED: &'static str = "Finished";
    pub const DELIVERED: &'static str = "Delivered";
    pub const ACCEPTED: &'static str = "Accepted";
    pub const REJECTED: &'static str = "Rejected";
    pub const CANCELED: &'static str = "Canceled";
    pub const DUPLICATE: &'static str = "Duplicate";

    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Terminal statuses never produce work and drop every event.
    pub fn is_terminal(&self) -> bool {
        matches!(self.0.as_str(), Self::ACCEPTED | Self::CANCELED | Self::DUPLICATE)
    }

    pub fn is_icebox(&self) -> bool {
        self.0 == Self::ICEBOX
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for IssueStatus {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for IssueStatus {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for IssueStatus {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for IssueStatus {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Issue snapshot as the governor evaluates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    /// Human-readable identifier, e.g. "PROJ-123".
    pub identifier: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: IssueStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    pub created_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<IssueId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

impl Issue {
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
#[path = "issue_tests.rs"]
mod tests;
