// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Override records, one per issue.

use fm_core::{Clock, OverrideRecord};

use super::Store;

impl<C: Clock> Store<C> {
    pub fn get_override(&self, issue_id: &str) -> Option<OverrideRecord> {
        self.with_state(|state| state.overrides.get(issue_id).cloned())
    }

    pub fn set_override(&self, record: OverrideRecord) {
        self.with_state_mut(|state| {
            state.overrides.insert(record.issue_id.as_str().to_string(), record);
        });
    }

    pub fn clear_override(&self, issue_id: &str) -> bool {
        self.with_state_mut(|state| state.overrides.remove(issue_id).is_some())
    }
}
