// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exclusive per-issue locks.

use fm_core::{Clock, IssueLock, WorkType, ISSUE_LOCK_TTL_MS};

use super::{Store, StoreState};

impl StoreState {
    /// Acquire the issue lock for a session. Expired locks are evicted on
    /// contact. Returns false when another live session holds it.
    pub(crate) fn lock_acquire(
        &mut self,
        issue_id: &str,
        session_id: &str,
        work_type: WorkType,
        now_ms: u64,
    ) -> bool {
        if let Some(existing) = self.locks.get(issue_id) {
            if !existing.is_expired(now_ms) {
                return existing.session_id == session_id;
            }
        }
        self.locks.insert(
            issue_id.to_string(),
            IssueLock {
                issue_id: issue_id.into(),
                session_id: session_id.into(),
                work_type,
                acquired_at_ms: now_ms,
                ttl_ms: ISSUE_LOCK_TTL_MS,
            },
        );
        true
    }

    /// Release only if held by the given session.
    pub(crate) fn lock_release(&mut self, issue_id: &str, session_id: &str) -> bool {
        match self.locks.get(issue_id) {
            Some(lock) if lock.session_id == session_id => {
                self.locks.remove(issue_id);
                true
            }
            _ => false,
        }
    }
}

impl<C: Clock> Store<C> {
    /// Live lock holder for an issue, if any.
    pub fn get_issue_lock(&self, issue_id: &str) -> Option<IssueLock> {
        let now = self.clock().epoch_ms();
        self.with_state(|state| {
            state.locks.get(issue_id).filter(|lock| !lock.is_expired(now)).cloned()
        })
    }

    /// Extend the lock lease; only the holding session may refresh.
    pub fn refresh_issue_lock(&self, issue_id: &str, session_id: &str) -> bool {
        let now = self.clock().epoch_ms();
        self.with_state_mut(|state| match state.locks.get_mut(issue_id) {
            Some(lock) if lock.session_id == session_id && !lock.is_expired(now) => {
                lock.acquired_at_ms = now;
                true
            }
            _ => false,
        })
    }
}

#[cfg(test)]
#[path = "locks_tests.rs"]
mod tests;
