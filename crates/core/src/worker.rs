// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker identity and registry record.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Claim leases expire this long after the last heartbeat refresh.
pub const WORKER_CLAIM_TTL_MS: u64 = 60 * 1000;

/// Unique identifier for a worker instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkerId(pub String);

impl WorkerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WorkerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for WorkerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for WorkerId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for WorkerId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Borrow<str> for WorkerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Registry entry for a worker in the pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerRecord {
    pub worker_id: WorkerId,
    pub hostname: String,
    pub capacity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Projects this worker serves; empty means any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<String>,
    pub registered_at_ms: u64,
    pub last_heartbeat_ms: u64,
    pub active_count: u32,
}

impl WorkerRecord {
    /// Whether this worker's lease has lapsed (missed heartbeats).
    pub fn is_stale(&self, now_ms: u64, lease_ms: u64) -> bool {
        now_ms >= self.last_heartbeat_ms.saturating_add(lease_ms)
    }

    /// Whether this worker serves the given project.
    pub fn serves_project(&self, project: Option<&str>) -> bool {
        match project {
            None => true,
            Some(p) => self.projects.is_empty() || self.projects.iter().any(|mine| mine == p),
        }
    }
}
