// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Window-based event deduplication and webhook idempotency marks.

use fm_core::Clock;

use super::Store;

/// Webhook idempotency marks live for a day.
const WEBHOOK_MARK_TTL_MS: u64 = 24 * 60 * 60 * 1000;

impl<C: Clock> Store<C> {
    /// Atomically test-and-mark a dedup key.
    ///
    /// Returns true when the key was seen within the window (caller drops
    /// the event); otherwise records `key → now + window_ms` and returns
    /// false.
    pub fn is_duplicate(&self, key: &str, window_ms: u64) -> bool {
        let now = self.clock().epoch_ms();
        self.with_state_mut(|state| {
            if let Some(expires) = state.dedup.get(key) {
                if *expires > now {
                    return true;
                }
            }
            state.dedup.insert(key.to_string(), now + window_ms);
            false
        })
    }

    /// Test-only: forget all dedup marks.
    pub fn clear_dedup(&self) {
        self.with_state_mut(|state| state.dedup.clear());
    }

    /// Idempotency mark for a raw webhook delivery. True when the key was
    /// already processed within the last day.
    pub fn webhook_already_processed(&self, idempotency_key: &str) -> bool {
        let now = self.clock().epoch_ms();
        self.with_state_mut(|state| {
            if let Some(expires) = state.webhook_marks.get(idempotency_key) {
                if *expires > now {
                    return true;
                }
            }
            state
                .webhook_marks
                .insert(idempotency_key.to_string(), now + WEBHOOK_MARK_TTL_MS);
            false
        })
    }
}

#[cfg(test)]
#[path = "dedup_tests.rs"]
mod tests;
