// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Global priority queue, kept sorted by (priority, queued_at, session).

use fm_core::{Clock, QueuedWork, WorkerRecord};

use super::{Store, StoreState};

impl StoreState {
    /// Insert preserving queue order. Idempotent on session id.
    pub(crate) fn queue_insert(&mut self, work: QueuedWork) {
        if self.queue.iter().any(|w| w.session_id == work.session_id) {
            return;
        }
        let at = self
            .queue
            .partition_point(|existing| existing.queue_cmp(&work) == std::cmp::Ordering::Less);
        self.queue.insert(at, work);
    }

    pub(crate) fn queue_remove(&mut self, session_id: &str) -> Option<QueuedWork> {
        let at = self.queue.iter().position(|w| w.session_id == session_id)?;
        Some(self.queue.remove(at))
    }
}

impl<C: Clock> Store<C> {
    pub fn queue_len(&self) -> usize {
        self.with_state(|state| state.queue.len())
    }

    /// Queue contents in claim order.
    pub fn queue_snapshot(&self) -> Vec<QueuedWork> {
        self.with_state(|state| state.queue.clone())
    }

    /// Work a given worker may claim: entries whose project is unset or in
    /// the worker's project list, in claim order.
    pub fn poll_work(&self, worker: &WorkerRecord) -> Vec<QueuedWork> {
        self.with_state(|state| {
            state
                .queue
                .iter()
                .filter(|w| worker.serves_project(w.project.as_deref()))
                .cloned()
                .collect()
        })
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
