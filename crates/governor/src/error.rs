// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Governor error type.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GovernorError {
    /// The bus rejected a publish because it is closed.
    #[error("event bus closed")]
    BusClosed,

    /// The bus already handed out its single subscription.
    #[error("event bus already has a subscriber")]
    AlreadySubscribed,
}
