// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The governor: one loop, one subscriber, sequential evaluations.

use fm_core::{Clock, GovernorConfig, GovernorEvent, Issue};
use fm_store::Store;
use fm_upstream::ApiMediator;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::adapter::PlatformAdapter;
use crate::bus::EventBus;
use crate::context::IssueContext;
use crate::error::GovernorError;
use crate::evaluate::{evaluate_issue, Evaluation, EventOutcome};

/// The decision and coordination engine for a set of projects.
pub struct Governor<C: Clock> {
    config: GovernorConfig,
    clock: C,
    store: Arc<Store<C>>,
    bus: EventBus,
    adapter: Arc<dyn PlatformAdapter>,
    mediator: Arc<ApiMediator<C>>,
}

impl<C: Clock> Governor<C> {
    pub fn new(
        config: GovernorConfig,
        clock: C,
        store: Arc<Store<C>>,
        bus: EventBus,
        adapter: Arc<dyn PlatformAdapter>,
    ) -> Self {
        let mediator =
            Arc::new(ApiMediator::new(clock.clone(), &config.rate_limit, config.breaker.clone()));
        Self { config, clock, store, bus, adapter, mediator }
    }

    pub fn config(&self) -> &GovernorConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn store(&self) -> &Arc<Store<C>> {
        &self.store
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn adapter(&self) -> Arc<dyn PlatformAdapter> {
        Arc::clone(&self.adapter)
    }

    pub fn mediator(&self) -> &Arc<ApiMediator<C>> {
        &self.mediator
    }

    /// Consume the bus until cancelled or closed.
    ///
    /// One subscriber, sequential evaluations; every envelope is acked,
    /// no-ops and evaluator failures included.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), GovernorError> {
        let mut stream = self.bus.subscribe().map_err(|_| GovernorError::AlreadySubscribed)?;
        tracing::info!(projects = ?self.config.projects, "governor loop started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("governor loop cancelled");
                    return Ok(());
                }
                envelope = stream.next() => {
                    let Some(envelope) = envelope else {
                        tracing::info!("event bus closed, governor loop ending");
                        return Ok(());
                    };
                    let outcome = self.handle_event(&envelope.event).await;
                    if let EventOutcome::Dropped { reason } = &outcome {
                        tracing::debug!(
                            issue = %envelope.event.issue_id(),
                            reason,
                            "event dropped"
                        );
                    }
                    self.bus.ack(envelope.id);
                }
            }
        }
    }

    /// Evaluate one event. Never fails: internal errors are logged and the
    /// event is treated as handled so the loop proceeds.
    pub async fn handle_event(&self, event: &GovernorEvent) -> EventOutcome {
        if self.store.is_duplicate(&event.dedup_key(), self.config.dedup_window_ms) {
            return EventOutcome::Duplicate;
        }

        // Children reveal their parents.
        if let Some(parent_id) = &event.issue().parent_id {
            self.store.mark_parent(parent_id.as_str());
        }

        match event {
            GovernorEvent::IssueStatusChanged { issue, .. }
            | GovernorEvent::PollSnapshot { issue, .. } => {
                self.evaluate_and_dispatch(issue, None).await
            }
            GovernorEvent::CommentAdded {
                issue, comment_id, comment_body, user_id, timestamp_ms, ..
            } => {
                self.handle_comment(issue, comment_id, comment_body, user_id.as_deref(), *timestamp_ms)
                    .await
            }
            GovernorEvent::SessionCompleted { session_id, outcome, .. } => {
                self.handle_session_completed(session_id, *outcome).await
            }
        }
    }

    /// Gather context, evaluate, and dispatch when the evaluation says so.
    pub(crate) async fn evaluate_and_dispatch(
        &self,
        issue: &Issue,
        prompt_hint: Option<&str>,
    ) -> EventOutcome {
        let context = IssueContext::gather(&self.store, issue);
        let evaluation =
            evaluate_issue(issue, &context, &self.config, prompt_hint, self.clock.epoch_ms());
        match evaluation {
            Evaluation::Drop { reason } => EventOutcome::Dropped { reason },
            Evaluation::Dispatch { work_type, action, priority, .. } => {
                self.dispatch_work(issue, &context, work_type, action, priority)
            }
        }
    }
}

#[cfg(test)]
#[path = "runtime_tests/mod.rs"]
mod tests;
