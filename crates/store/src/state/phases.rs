// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Processing phase completion records.

use fm_core::{Clock, ProcessingPhase};

use super::Store;

pub(crate) fn phase_key(issue_id: &str, phase: ProcessingPhase) -> String {
    format!("{issue_id}:{phase}")
}

impl<C: Clock> Store<C> {
    /// Whether a phase completed for the issue within the record TTL.
    pub fn phase_completed(&self, issue_id: &str, phase: ProcessingPhase) -> bool {
        let now = self.clock().epoch_ms();
        self.with_state(|state| {
            state
                .phases
                .get(&phase_key(issue_id, phase))
                .map(|record| !record.is_expired(now))
                .unwrap_or(false)
        })
    }
}
