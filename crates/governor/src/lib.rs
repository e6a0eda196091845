// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fm-governor: the decision and coordination layer.
//!
//! One governor instance consumes a single event stream, evaluates each
//! event against per-issue context in the store, and either drops it,
//! queues work, parks work behind an issue lock, stores a pending prompt,
//! or updates override state. Poll sweeps re-inject synthetic snapshots
//! to close webhook gaps.

pub mod adapter;
pub mod bus;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod evaluate;
pub mod funnel;
pub mod overrides;
pub mod runtime;
pub mod sweep;

pub use adapter::{normalize_tracker_webhook, PlatformAdapter, ProjectScan};
#[cfg(any(test, feature = "test-support"))]
pub use adapter::fake::FakeAdapter;
pub use bus::{BusError, EventBus, EventStream};
pub use context::IssueContext;
pub use error::GovernorError;
pub use evaluate::{AgentAction, EventOutcome};
pub use funnel::{determine_top_of_funnel_action, TofAction, TofActionKind};
pub use runtime::Governor;
pub use sweep::run_poll_sweep;
