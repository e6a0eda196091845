// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pending prompt FIFOs, one per session.

use fm_core::{Clock, IssueId, PendingPrompt, PromptId, SessionId};

use super::Store;

impl<C: Clock> Store<C> {
    pub fn store_pending_prompt(
        &self,
        session_id: &SessionId,
        issue_id: &IssueId,
        prompt: impl Into<String>,
        user: Option<String>,
    ) -> PendingPrompt {
        let entry = PendingPrompt {
            id: PromptId::generate(),
            session_id: session_id.clone(),
            issue_id: issue_id.clone(),
            prompt: prompt.into(),
            user,
            created_at_ms: self.clock().epoch_ms(),
        };
        self.with_state_mut(|state| {
            state
                .prompts
                .entry(session_id.as_str().to_string())
                .or_default()
                .push(entry.clone());
        });
        entry
    }

    pub fn get_pending_prompts(&self, session_id: &str) -> Vec<PendingPrompt> {
        self.with_state(|state| state.prompts.get(session_id).cloned().unwrap_or_default())
    }

    /// Pop the oldest prompt.
    pub fn pop_pending_prompt(&self, session_id: &str) -> Option<PendingPrompt> {
        self.with_state_mut(|state| {
            let entries = state.prompts.get_mut(session_id)?;
            if entries.is_empty() {
                return None;
            }
            let entry = entries.remove(0);
            if entries.is_empty() {
                state.prompts.remove(session_id);
            }
            Some(entry)
        })
    }

    /// Atomic remove-by-id; `None` when another worker claimed it first.
    pub fn claim_pending_prompt(&self, session_id: &str, prompt_id: &str) -> Option<PendingPrompt> {
        self.with_state_mut(|state| {
            let entries = state.prompts.get_mut(session_id)?;
            let at = entries.iter().position(|p| p.id.as_str() == prompt_id)?;
            let entry = entries.remove(at);
            if entries.is_empty() {
                state.prompts.remove(session_id);
            }
            Some(entry)
        })
    }

    /// All pending prompts keyed by session, for worker poll responses.
    pub fn pending_prompts_for_sessions(
        &self,
        session_ids: &[String],
    ) -> std::collections::HashMap<String, Vec<PendingPrompt>> {
        self.with_state(|state| {
            session_ids
                .iter()
                .filter_map(|sid| {
                    state.prompts.get(sid).map(|entries| (sid.clone(), entries.clone()))
                })
                .collect()
        })
    }
}

#[cfg(test)]
#[path = "prompts_tests.rs"]
mod tests;
