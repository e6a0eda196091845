// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The in-memory state substrate.
//!
//! Key naming mirrors the documented layout (`session:{id}`,
//! `lock:issue:{id}`, ...) so each map corresponds one-to-one with the
//! Redis keyspace a production deployment substitutes.

mod dedup;
mod dispatch;
mod locks;
mod overrides;
mod parked;
mod phases;
mod prompts;
mod queue;
mod sessions;
mod workers;

pub use dispatch::{
    ClaimOutcome, ClaimReason, DispatchOutcome, FinalizeOutcome, StatusPatch, StatusUpdateOutcome,
    StopOutcome, TransferOutcome,
};
pub use workers::ReapSummary;

use fm_core::{
    Clock, IssueLock, OverrideRecord, PendingPrompt, ProcessingPhaseRecord, QueuedWork,
    SessionRecord, WorkerRecord,
};
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Lease a claim holds between heartbeats, ms.
pub(crate) struct ClaimLease {
    pub worker_id: String,
    pub expires_at_ms: u64,
}

/// All governor state, guarded by a single mutex.
#[derive(Default)]
pub(crate) struct StoreState {
    /// `session:{sessionId}`
    pub sessions: HashMap<String, SessionRecord>,
    /// Expiry stamps for terminal sessions (7-day TTL).
    pub session_expiry: HashMap<String, u64>,
    /// `queue:work`, kept sorted by (priority, queued_at, session_id).
    pub queue: Vec<QueuedWork>,
    /// `claim:{sessionId}`
    pub claims: HashMap<String, ClaimLease>,
    /// `lock:issue:{issueId}`
    pub locks: HashMap<String, IssueLock>,
    /// `parked:issue:{issueId}`
    pub parked: HashMap<String, Vec<QueuedWork>>,
    /// `worker:{workerId}`
    pub workers: HashMap<String, WorkerRecord>,
    /// `worker:{workerId}:sessions`
    pub worker_sessions: HashMap<String, BTreeSet<String>>,
    /// `override:{issueId}`
    pub overrides: HashMap<String, OverrideRecord>,
    /// `governor:processing:{issueId}:{phase}`
    pub phases: HashMap<String, ProcessingPhaseRecord>,
    /// `dedup:{key}` → expiry epoch ms
    pub dedup: HashMap<String, u64>,
    /// `prompts:{sessionId}`
    pub prompts: HashMap<String, Vec<PendingPrompt>>,
    /// `webhook:processed:{idempotencyKey}` → expiry epoch ms
    pub webhook_marks: HashMap<String, u64>,
    /// Cooldown stamps: issueId → eligible-again epoch ms.
    pub cooldowns: HashMap<String, u64>,
    /// Issues known to have children, learned from project scans and
    /// child snapshots.
    pub known_parents: HashSet<String>,
}

/// Shared state store.
pub struct Store<C: Clock> {
    clock: C,
    state: Mutex<StoreState>,
}

impl<C: Clock> Store<C> {
    pub fn new(clock: C) -> Self {
        Self { clock, state: Mutex::new(StoreState::default()) }
    }

    pub(crate) fn clock(&self) -> &C {
        &self.clock
    }

    pub(crate) fn with_state<T>(&self, f: impl FnOnce(&StoreState) -> T) -> T {
        let guard = self.state.lock();
        f(&guard)
    }

    pub(crate) fn with_state_mut<T>(&self, f: impl FnOnce(&mut StoreState) -> T) -> T {
        let mut guard = self.state.lock();
        f(&mut guard)
    }

    /// Prune everything past its TTL. Called opportunistically by the
    /// daemon's reaper tick.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.epoch_ms();
        self.with_state_mut(|state| {
            let mut pruned = 0;
            let expired: Vec<String> = state
                .session_expiry
                .iter()
                .filter(|(_, expires)| **expires <= now)
                .map(|(id, _)| id.clone())
                .collect();
            for id in expired {
                state.sessions.remove(&id);
                state.session_expiry.remove(&id);
                state.prompts.remove(&id);
                pruned += 1;
            }
            let before = state.dedup.len();
            state.dedup.retain(|_, expires| *expires > now);
            pruned += before - state.dedup.len();
            let before = state.webhook_marks.len();
            state.webhook_marks.retain(|_, expires| *expires > now);
            pruned += before - state.webhook_marks.len();
            let before = state.phases.len();
            state.phases.retain(|_, record| !record.is_expired(now));
            pruned += before - state.phases.len();
            state.cooldowns.retain(|_, until| *until > now);
            if pruned > 0 {
                tracing::debug!(pruned, "swept expired store entries");
            }
            pruned
        })
    }
}
