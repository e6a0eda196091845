// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compound session/queue operations.
//!
//! Each public method here is one atomic step of the session state
//! machine: dispatch (lock + queue + record), claim (queue + record +
//! reverse index), status update, terminal finalization with promotion,
//! ownership transfer, and the stop signal. Atomicity comes from running
//! the whole step under the store mutex; a Redis deployment runs the same
//! steps as scripts.

use fm_core::{
    Clock, ProcessingPhase, QueuedWork, SessionRecord, SessionStatus, WorkerId,
    SESSION_TTL_AFTER_TERMINAL_MS, WORKER_CLAIM_TTL_MS,
};

use super::{ClaimLease, Store, StoreState};

/// Result of a dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Work entered the global queue.
    pub dispatched: bool,
    /// Work was parked behind the issue lock holder.
    pub parked: bool,
    /// Parking replaced an earlier entry of the same work type.
    pub replaced: bool,
}

/// Result of a claim attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    Claimed { session: SessionRecord, work: QueuedWork },
    Rejected { reason: ClaimReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimReason {
    /// No queue entry for the session (another worker won the race or the
    /// work was stopped).
    Expired,
    /// Session exists but is not pending.
    WrongStatus,
    /// Backend hiccup; the caller re-queues and retries.
    TransientFailure,
}

impl ClaimReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::WrongStatus => "wrong_status",
            Self::TransientFailure => "transient_failure",
        }
    }
}

/// Extra fields a worker may attach to a status update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusPatch {
    pub provider_session_id: Option<String>,
    pub worktree_path: Option<String>,
    pub total_cost_usd: Option<f64>,
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
}

/// Result of a worker status update.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusUpdateOutcome {
    Updated { previous: SessionStatus },
    /// Terminal statuses are absorbing; late updates are ignored.
    IgnoredTerminal,
    /// Backwards or same-rank move.
    InvalidTransition { from: SessionStatus },
    /// Update came from a worker that does not own the session.
    Forbidden,
    NotFound,
}

/// Result of terminal finalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinalizeOutcome {
    /// False when the session was already finalized (idempotent repeat).
    pub finalized: bool,
    /// Parked work promoted into the queue, if any.
    pub promoted: Option<QueuedWork>,
    /// Phase marked completed (research / backlog-creation on success).
    pub phase_marked: Option<ProcessingPhase>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    Transferred,
    /// CAS failed: current owner differs from `old_worker_id`.
    WrongWorker,
    NotFound,
}

/// Result of a stop signal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StopOutcome {
    pub stopped: bool,
    pub promoted: Option<QueuedWork>,
}

impl StoreState {
    /// Promote the best parked entry for an issue: re-acquire the (now
    /// free) lock and move the entry into the global queue.
    pub(crate) fn promote_next(&mut self, issue_id: &str, now_ms: u64) -> Option<QueuedWork> {
        let work = self.parked_pop_best(issue_id)?;
        self.lock_acquire(issue_id, work.session_id.as_str(), work.work_type, now_ms);
        if let Some(record) = self.sessions.get_mut(work.session_id.as_str()) {
            record.queued_at_ms = Some(now_ms);
            record.updated_at_ms = now_ms;
        }
        let mut promoted = work.clone();
        promoted.queued_at_ms = now_ms;
        self.queue_insert(promoted.clone());
        Some(promoted)
    }

    pub(crate) fn stamp_terminal(&mut self, session_id: &str, now_ms: u64) {
        self.session_expiry
            .insert(session_id.to_string(), now_ms + SESSION_TTL_AFTER_TERMINAL_MS);
    }
}

impl<C: Clock> Store<C> {
    /// Dispatch work: take the issue lock and enter the queue, or park
    /// behind the current holder. The pending session record is stored
    /// either way so the session id stays resolvable.
    pub fn dispatch(&self, record: SessionRecord, work: QueuedWork) -> DispatchOutcome {
        let now = self.clock().epoch_ms();
        self.with_state_mut(|state| {
            let issue_id = work.issue_id.as_str().to_string();
            let session_id = work.session_id.as_str().to_string();
            state.sessions.insert(session_id.clone(), record);

            if state.lock_acquire(&issue_id, &session_id, work.work_type, now) {
                state.queue_insert(work);
                DispatchOutcome { dispatched: true, parked: false, replaced: false }
            } else {
                let replaced = state.park(work);
                if let Some(old) = &replaced {
                    // The superseded intent will never run.
                    if let Some(old_record) = state.sessions.get_mut(old.session_id.as_str()) {
                        old_record.status = SessionStatus::Stopped;
                        old_record.updated_at_ms = now;
                    }
                    state.stamp_terminal(old.session_id.as_str(), now);
                }
                DispatchOutcome { dispatched: false, parked: true, replaced: replaced.is_some() }
            }
        })
    }

    /// Atomic claim: remove the queue entry, move the session to
    /// `claimed`, bind the worker, and index the claim, or change
    /// nothing.
    pub fn claim_session(&self, session_id: &str, worker_id: &WorkerId) -> ClaimOutcome {
        let now = self.clock().epoch_ms();
        self.with_state_mut(|state| {
            match state.sessions.get(session_id) {
                None => return ClaimOutcome::Rejected { reason: ClaimReason::Expired },
                Some(record) if record.status != SessionStatus::Pending => {
                    return ClaimOutcome::Rejected { reason: ClaimReason::WrongStatus };
                }
                Some(_) => {}
            }
            let Some(work) = state.queue_remove(session_id) else {
                return ClaimOutcome::Rejected { reason: ClaimReason::Expired };
            };
            // Session existence was checked above; this lookup cannot miss.
            let Some(record) = state.sessions.get_mut(session_id) else {
                return ClaimOutcome::Rejected { reason: ClaimReason::TransientFailure };
            };
            record.status = SessionStatus::Claimed;
            record.worker_id = Some(worker_id.clone());
            record.claimed_at_ms = Some(now);
            record.updated_at_ms = now;
            let session = record.clone();

            state.claims.insert(
                session_id.to_string(),
                ClaimLease {
                    worker_id: worker_id.as_str().to_string(),
                    expires_at_ms: now + WORKER_CLAIM_TTL_MS,
                },
            );
            state
                .worker_sessions
                .entry(worker_id.as_str().to_string())
                .or_default()
                .insert(session_id.to_string());

            ClaimOutcome::Claimed { session, work }
        })
    }

    /// Worker-reported status move along the lattice.
    pub fn update_session_status(
        &self,
        session_id: &str,
        worker_id: &WorkerId,
        next: SessionStatus,
        patch: StatusPatch,
    ) -> StatusUpdateOutcome {
        let now = self.clock().epoch_ms();
        self.with_state_mut(|state| {
            let Some(record) = state.sessions.get_mut(session_id) else {
                return StatusUpdateOutcome::NotFound;
            };
            if record.status.is_terminal() {
                return StatusUpdateOutcome::IgnoredTerminal;
            }
            // Only the bound worker may move a session; unclaimed sessions
            // move through claim or stop, never the status route.
            match &record.worker_id {
                Some(owner) if owner == worker_id => {}
                _ => return StatusUpdateOutcome::Forbidden,
            }
            if !record.status.can_transition_to(next) {
                return StatusUpdateOutcome::InvalidTransition { from: record.status };
            }
            let previous = record.status;
            record.status = next;
            record.updated_at_ms = now;
            if let Some(provider) = patch.provider_session_id {
                record.provider_session_id = Some(provider);
            }
            if let Some(worktree) = patch.worktree_path {
                record.worktree_path = Some(worktree);
            }
            if let Some(cost) = patch.total_cost_usd {
                record.total_cost_usd = Some(cost);
            }
            if let Some(tokens) = patch.input_tokens {
                record.input_tokens = Some(tokens);
            }
            if let Some(tokens) = patch.output_tokens {
                record.output_tokens = Some(tokens);
            }
            if next.is_terminal() {
                record.worker_id = None;
                state.stamp_terminal(session_id, now);
            }
            StatusUpdateOutcome::Updated { previous }
        })
    }

    /// Terminal handling: release the claim and the issue lock, start the
    /// cooldown, mark the processing phase on success, and promote the
    /// next parked entry. Idempotent.
    pub fn finalize_session(
        &self,
        session_id: &str,
        success: bool,
        cooldown_ms: u64,
    ) -> FinalizeOutcome {
        let now = self.clock().epoch_ms();
        self.with_state_mut(|state| {
            let Some(record) = state.sessions.get_mut(session_id) else {
                return FinalizeOutcome::default();
            };
            let issue_id = record.issue_id.as_str().to_string();
            let work_type = record.work_type;
            let session = record.session_id.clone();

            // The completion report may outrun the worker's own terminal
            // status update; absorb the record either way.
            if !record.status.is_terminal() {
                record.status =
                    if success { SessionStatus::Completed } else { SessionStatus::Failed };
                record.worker_id = None;
                record.updated_at_ms = now;
                state.stamp_terminal(session_id, now);
            }

            // Already released? Then a previous finalize ran.
            let holds_lock = state
                .locks
                .get(&issue_id)
                .map(|lock| lock.session_id == session)
                .unwrap_or(false);
            let has_claim = state.claims.contains_key(session_id);
            if !holds_lock && !has_claim {
                return FinalizeOutcome::default();
            }

            state.release_claim(session_id);
            state.lock_release(&issue_id, session_id);
            state.cooldowns.insert(issue_id.clone(), now + cooldown_ms);

            let phase_marked = if success {
                let phase = ProcessingPhase::for_work_type(work_type);
                if let Some(phase) = phase {
                    state.phases.insert(
                        super::phases::phase_key(&issue_id, phase),
                        fm_core::ProcessingPhaseRecord {
                            issue_id: issue_id.as_str().into(),
                            phase,
                            completed_at_ms: now,
                            session_id: Some(session),
                        },
                    );
                }
                phase
            } else {
                None
            };

            let promoted = state.promote_next(&issue_id, now);
            FinalizeOutcome { finalized: true, promoted, phase_marked }
        })
    }

    /// CAS on the session's worker binding.
    pub fn transfer_ownership(
        &self,
        session_id: &str,
        old_worker_id: &WorkerId,
        new_worker_id: &WorkerId,
    ) -> TransferOutcome {
        let now = self.clock().epoch_ms();
        self.with_state_mut(|state| {
            let Some(record) = state.sessions.get_mut(session_id) else {
                return TransferOutcome::NotFound;
            };
            if record.worker_id.as_ref() != Some(old_worker_id) {
                return TransferOutcome::WrongWorker;
            }
            record.worker_id = Some(new_worker_id.clone());
            record.updated_at_ms = now;

            if let Some(sessions) = state.worker_sessions.get_mut(old_worker_id.as_str()) {
                sessions.remove(session_id);
                if sessions.is_empty() {
                    state.worker_sessions.remove(old_worker_id.as_str());
                }
            }
            state
                .worker_sessions
                .entry(new_worker_id.as_str().to_string())
                .or_default()
                .insert(session_id.to_string());
            if let Some(lease) = state.claims.get_mut(session_id) {
                lease.worker_id = new_worker_id.as_str().to_string();
                lease.expires_at_ms = now + WORKER_CLAIM_TTL_MS;
            }
            TransferOutcome::Transferred
        })
    }

    /// Stop signal: tear the session out of every structure and promote
    /// whatever was waiting behind it.
    pub fn stop_session(&self, session_id: &str) -> StopOutcome {
        let now = self.clock().epoch_ms();
        self.with_state_mut(|state| {
            let Some(record) = state.sessions.get_mut(session_id) else {
                return StopOutcome::default();
            };
            let issue_id = record.issue_id.as_str().to_string();
            let was_active = !record.status.is_terminal();
            if was_active {
                record.status = SessionStatus::Stopped;
                record.worker_id = None;
                record.updated_at_ms = now;
                state.stamp_terminal(session_id, now);
            }
            state.queue_remove(session_id);
            state.parked_remove_session(session_id);
            state.release_claim(session_id);
            let held = state.lock_release(&issue_id, session_id);
            let promoted = if held { state.promote_next(&issue_id, now) } else { None };
            StopOutcome { stopped: was_active, promoted }
        })
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
