// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fm-core: Domain vocabulary for the Foreman governor
//!
//! Issues, work types, sessions, queue entries, comment directives,
//! processing phases, pending prompts, governor events, and configuration.

pub mod clock;
pub mod config;
pub mod directive;
pub mod event;
pub mod issue;
pub mod phase;
pub mod prompt;
pub mod queue;
pub mod session;
pub mod work;
pub mod worker;

pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "test-support"))]
pub use clock::ManualClock;
pub use config::{BreakerConfig, GovernorConfig, RateLimitConfig, TopOfFunnelConfig};
pub use directive::{
    find_latest_override, parse_directive, Directive, IssueComment, OverridePriority,
    OverrideRecord, ParsedOverride,
};
pub use event::{EventEnvelope, EventSource, GovernorEvent, SessionOutcome};
pub use issue::{Issue, IssueId, IssueStatus};
pub use phase::{ProcessingPhase, ProcessingPhaseRecord, PROCESSING_PHASE_TTL_MS};
pub use prompt::{PendingPrompt, PromptId};
pub use queue::QueuedWork;
pub use session::{
    IssueLock, SessionEventKind, SessionId, SessionRecord, SessionStatus, ISSUE_LOCK_TTL_MS,
    SESSION_TTL_AFTER_TERMINAL_MS, SYNTHETIC_SESSION_PREFIX,
};
pub use work::WorkType;
pub use worker::{WorkerId, WorkerRecord, WORKER_CLAIM_TTL_MS};
