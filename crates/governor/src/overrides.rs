// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Applying comment directives to governor state.

use fm_core::{
    parse_directive, Clock, Directive, Issue, OverrideRecord, SessionStatus,
};

use crate::evaluate::EventOutcome;
use crate::runtime::Governor;

impl<C: Clock> Governor<C> {
    /// Handle a `comment-added` event.
    ///
    /// Directives mutate override state (and may re-evaluate); anything
    /// else addressed at a live session becomes a pending prompt.
    pub(crate) async fn handle_comment(
        &self,
        issue: &Issue,
        comment_id: &str,
        comment_body: &str,
        user_id: Option<&str>,
        timestamp_ms: u64,
    ) -> EventOutcome {
        // Comments without a human author are bot chatter.
        let is_bot = user_id.is_none();
        let directive = if is_bot { None } else { parse_directive(comment_body) };

        let Some(directive) = directive else {
            // Mid-session input goes to the side-channel, never the queue:
            // re-queueing would abandon the provider session.
            if let Some(session) = self.store().active_session_for_issue(issue.id.as_str()) {
                if matches!(session.status, SessionStatus::Running | SessionStatus::Claimed) {
                    self.store().store_pending_prompt(
                        &session.session_id,
                        &issue.id,
                        comment_body,
                        user_id.map(String::from),
                    );
                    tracing::debug!(
                        issue = %issue.id,
                        session = %session.session_id,
                        "stored pending prompt"
                    );
                    return EventOutcome::PromptStored { session_id: session.session_id };
                }
            }
            return EventOutcome::Dropped { reason: "comment carries no directive".to_string() };
        };

        match directive {
            Directive::Hold { ref reason } => {
                let reason = reason.clone();
                self.store_override(issue, directive.clone(), comment_id, user_id, timestamp_ms, reason);
                tracing::info!(issue = %issue.id, "hold directive stored");
                EventOutcome::OverrideApplied { directive: "hold", followup: None }
            }
            Directive::Resume => {
                self.store().clear_override(issue.id.as_str());
                tracing::info!(issue = %issue.id, "override cleared, re-evaluating");
                let followup = self.evaluate_and_dispatch(issue, None).await;
                EventOutcome::OverrideApplied {
                    directive: "resume",
                    followup: Some(Box::new(followup)),
                }
            }
            Directive::SkipQa => {
                self.store_override(issue, directive, comment_id, user_id, timestamp_ms, None);
                EventOutcome::OverrideApplied { directive: "skip-qa", followup: None }
            }
            Directive::Decompose => {
                self.store_override(issue, directive, comment_id, user_id, timestamp_ms, None);
                // A rejected issue decomposes through refinement work.
                let followup = self.evaluate_and_dispatch(issue, None).await;
                EventOutcome::OverrideApplied {
                    directive: "decompose",
                    followup: Some(Box::new(followup)),
                }
            }
            Directive::Reassign => {
                // Invalidate the worker binding: stop whatever is active,
                // then evaluate fresh.
                if let Some(session) = self.store().active_session_for_issue(issue.id.as_str()) {
                    self.store().stop_session(session.session_id.as_str());
                    tracing::info!(
                        issue = %issue.id,
                        session = %session.session_id,
                        "reassign stopped active session"
                    );
                }
                self.store().clear_override(issue.id.as_str());
                let followup = self.evaluate_and_dispatch(issue, None).await;
                EventOutcome::OverrideApplied {
                    directive: "reassign",
                    followup: Some(Box::new(followup)),
                }
            }
            Directive::Priority { .. } => {
                self.store_override(issue, directive, comment_id, user_id, timestamp_ms, None);
                EventOutcome::OverrideApplied { directive: "priority", followup: None }
            }
        }
    }

    fn store_override(
        &self,
        issue: &Issue,
        directive: Directive,
        comment_id: &str,
        user_id: Option<&str>,
        timestamp_ms: u64,
        reason: Option<String>,
    ) {
        self.store().set_override(OverrideRecord {
            issue_id: issue.id.clone(),
            directive,
            comment_id: comment_id.to_string(),
            user_id: user_id.map(String::from),
            timestamp_ms,
            reason,
        });
    }
}
