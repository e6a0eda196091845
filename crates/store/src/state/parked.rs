// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parked work: dispatches deferred behind a held issue lock.

use fm_core::QueuedWork;

use super::StoreState;

impl StoreState {
    /// Park work under its issue. At most one entry per work type; a newer
    /// arrival replaces the older one (latest intent wins). Returns the
    /// replaced entry, if any.
    pub(crate) fn park(&mut self, work: QueuedWork) -> Option<QueuedWork> {
        let entries = self.parked.entry(work.issue_id.as_str().to_string()).or_default();
        let replaced = entries
            .iter()
            .position(|w| w.work_type == work.work_type)
            .map(|at| entries.remove(at));
        entries.push(work);
        replaced
    }

    /// Pop the best parked entry for an issue (priority asc, then FIFO).
    pub(crate) fn parked_pop_best(&mut self, issue_id: &str) -> Option<QueuedWork> {
        let entries = self.parked.get_mut(issue_id)?;
        let best = entries
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.queue_cmp(b))
            .map(|(at, _)| at)?;
        let work = entries.remove(best);
        if entries.is_empty() {
            self.parked.remove(issue_id);
        }
        Some(work)
    }

    /// Drop a specific session's parked entry wherever it sits.
    pub(crate) fn parked_remove_session(&mut self, session_id: &str) -> bool {
        let mut removed = false;
        self.parked.retain(|_, entries| {
            let before = entries.len();
            entries.retain(|w| w.session_id != session_id);
            removed |= entries.len() != before;
            !entries.is_empty()
        });
        removed
    }
}
