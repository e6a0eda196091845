// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker registry, claim leases, and the stale-worker reaper.

use fm_core::{Clock, SessionStatus, WorkerRecord, QueuedWork, WORKER_CLAIM_TTL_MS};

use super::{Store, StoreState};

/// What a reaper pass did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReapSummary {
    pub workers_removed: usize,
    pub sessions_requeued: usize,
    pub sessions_failed: usize,
}

impl StoreState {
    /// Detach a session from its worker's reverse index and claim lease.
    pub(crate) fn release_claim(&mut self, session_id: &str) {
        if let Some(lease) = self.claims.remove(session_id) {
            if let Some(sessions) = self.worker_sessions.get_mut(&lease.worker_id) {
                sessions.remove(session_id);
                if sessions.is_empty() {
                    self.worker_sessions.remove(&lease.worker_id);
                }
            }
        }
    }
}

impl<C: Clock> Store<C> {
    pub fn register_worker(&self, record: WorkerRecord) {
        self.with_state_mut(|state| {
            state.workers.insert(record.worker_id.as_str().to_string(), record);
        });
    }

    pub fn get_worker(&self, worker_id: &str) -> Option<WorkerRecord> {
        self.with_state(|state| state.workers.get(worker_id).cloned())
    }

    pub fn worker_count(&self) -> usize {
        self.with_state(|state| state.workers.len())
    }

    /// Heartbeat: bump liveness, refresh every claim lease this worker
    /// holds. Returns false when the worker is unknown (it must
    /// re-register).
    pub fn worker_heartbeat(&self, worker_id: &str, active_count: u32) -> bool {
        let now = self.clock().epoch_ms();
        self.with_state_mut(|state| {
            let Some(record) = state.workers.get_mut(worker_id) else {
                return false;
            };
            record.last_heartbeat_ms = now;
            record.active_count = active_count;
            if let Some(sessions) = state.worker_sessions.get(worker_id) {
                for session_id in sessions {
                    if let Some(lease) = state.claims.get_mut(session_id.as_str()) {
                        lease.expires_at_ms = now + WORKER_CLAIM_TTL_MS;
                    }
                }
            }
            true
        })
    }

    /// Session ids currently bound to a worker.
    pub fn worker_session_ids(&self, worker_id: &str) -> Vec<String> {
        self.with_state(|state| {
            state
                .worker_sessions
                .get(worker_id)
                .map(|s| s.iter().cloned().collect())
                .unwrap_or_default()
        })
    }

    /// Remove workers whose lease lapsed and recover their sessions:
    /// claimed-but-never-run work returns to the queue, running work is
    /// failed and its issue lock released so parked work can promote.
    pub fn reap_stale_workers(&self, lease_ms: u64) -> ReapSummary {
        let now = self.clock().epoch_ms();
        self.with_state_mut(|state| {
            let mut summary = ReapSummary::default();
            let stale: Vec<String> = state
                .workers
                .values()
                .filter(|w| w.is_stale(now, lease_ms))
                .map(|w| w.worker_id.as_str().to_string())
                .collect();

            for worker_id in stale {
                let session_ids: Vec<String> = state
                    .worker_sessions
                    .remove(&worker_id)
                    .map(|s| s.into_iter().collect())
                    .unwrap_or_default();
                for session_id in session_ids {
                    state.claims.remove(&session_id);
                    let Some(record) = state.sessions.get_mut(&session_id) else {
                        continue;
                    };
                    match record.status {
                        SessionStatus::Claimed => {
                            // Mid-claim crash: put the work back so it is
                            // never stranded.
                            record.status = SessionStatus::Pending;
                            record.worker_id = None;
                            record.claimed_at_ms = None;
                            record.updated_at_ms = now;
                            let work = QueuedWork {
                                session_id: record.session_id.clone(),
                                issue_id: record.issue_id.clone(),
                                issue_identifier: record.issue_identifier.clone(),
                                priority: record.priority,
                                queued_at_ms: record.queued_at_ms.unwrap_or(now),
                                prompt: record.prompt_context.clone().unwrap_or_default(),
                                provider_session_id: record.provider_session_id.clone(),
                                work_type: record.work_type,
                                project: None,
                            };
                            state.queue_insert(work);
                            summary.sessions_requeued += 1;
                        }
                        SessionStatus::Running | SessionStatus::Finalizing => {
                            record.status = SessionStatus::Failed;
                            record.worker_id = None;
                            record.updated_at_ms = now;
                            let issue_id = record.issue_id.as_str().to_string();
                            let session_id = record.session_id.as_str().to_string();
                            state.stamp_terminal(&session_id, now);
                            state.lock_release(&issue_id, &session_id);
                            state.promote_next(&issue_id, now);
                            summary.sessions_failed += 1;
                        }
                        _ => {}
                    }
                }
                state.workers.remove(&worker_id);
                summary.workers_removed += 1;
                tracing::warn!(worker = %worker_id, "reaped stale worker");
            }
            summary
        })
    }
}

#[cfg(test)]
#[path = "workers_tests.rs"]
mod tests;
