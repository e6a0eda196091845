// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session record reads and bookkeeping.

use fm_core::{Clock, SessionRecord, SessionStatus};
use std::collections::HashMap;

use super::Store;

impl<C: Clock> Store<C> {
    pub fn get_session(&self, session_id: &str) -> Option<SessionRecord> {
        self.with_state(|state| state.sessions.get(session_id).cloned())
    }

    /// Any non-terminal session bound to the issue.
    pub fn active_session_for_issue(&self, issue_id: &str) -> Option<SessionRecord> {
        self.with_state(|state| {
            state
                .sessions
                .values()
                .find(|s| s.issue_id == issue_id && s.is_active())
                .cloned()
        })
    }

    pub fn sessions_by_status(&self) -> HashMap<SessionStatus, usize> {
        self.with_state(|state| {
            let mut counts = HashMap::new();
            for session in state.sessions.values() {
                *counts.entry(session.status).or_insert(0) += 1;
            }
            counts
        })
    }

    pub fn all_sessions(&self) -> Vec<SessionRecord> {
        self.with_state(|state| state.sessions.values().cloned().collect())
    }

    /// Cooldown check: true until the stamp set by terminal handling lapses.
    pub fn within_cooldown(&self, issue_id: &str) -> bool {
        let now = self.clock().epoch_ms();
        self.with_state(|state| {
            state.cooldowns.get(issue_id).map(|until| *until > now).unwrap_or(false)
        })
    }

    /// Parent knowledge, fed by project scans and child snapshots.
    pub fn is_known_parent(&self, issue_id: &str) -> bool {
        self.with_state(|state| state.known_parents.contains(issue_id))
    }

    pub fn mark_parent(&self, issue_id: &str) {
        self.with_state_mut(|state| {
            state.known_parents.insert(issue_id.to_string());
        });
    }

    pub fn mark_parents<I: IntoIterator<Item = String>>(&self, issue_ids: I) {
        self.with_state_mut(|state| {
            state.known_parents.extend(issue_ids);
        });
    }
}

#[cfg(test)]
#[path = "sessions_tests.rs"]
mod tests;
