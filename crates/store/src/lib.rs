// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fm-store: shared state substrate for the governor.
//!
//! Sessions, the global work queue, issue locks, parked work, overrides,
//! processing phases, pending prompts, workers, and dedup marks. Every
//! multi-key operation runs under one lock, giving the atomicity the
//! documented Redis layout gets from scripts; a Redis-backed store can be
//! substituted behind the same surface.

mod state;

pub use state::{
    ClaimOutcome, ClaimReason, DispatchOutcome, FinalizeOutcome, ReapSummary, StatusPatch,
    StatusUpdateOutcome, StopOutcome, Store, TransferOutcome,
};
