// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Governor configuration, loadable from TOML with serde defaults.

use crate::work::WorkType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Top-level governor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernorConfig {
    /// Projects this governor instance owns.
    pub projects: Vec<String>,
    /// Poll sweep interval; `None` leaves the sweep timer unarmed.
    pub poll_interval_ms: Option<u64>,
    pub enable_polling: bool,
    pub dedup_window_ms: u64,
    pub top_of_funnel: TopOfFunnelConfig,
    /// Queue priority per work type; unlisted types fall back to the
    /// built-in table.
    pub work_type_priority: HashMap<WorkType, i64>,
    /// Ineligibility window after a terminal session on the same issue.
    pub cooldown_ms: u64,
    /// Opaque bearer token workers present on every call.
    pub worker_auth_token: String,
    pub rate_limit: RateLimitConfig,
    pub breaker: BreakerConfig,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            projects: Vec::new(),
            poll_interval_ms: None,
            enable_polling: false,
            dedup_window_ms: 10_000,
            top_of_funnel: TopOfFunnelConfig::default(),
            work_type_priority: HashMap::new(),
            cooldown_ms: 60_000,
            worker_auth_token: String::new(),
            rate_limit: RateLimitConfig::default(),
            breaker: BreakerConfig::default(),
        }
    }
}

impl GovernorConfig {
    /// Queue priority for a work type, honoring config overrides.
    pub fn priority_for(&self, work: WorkType) -> i64 {
        self.work_type_priority.get(&work).copied().unwrap_or_else(|| work.default_priority())
    }
}

/// Icebox pre-processing policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TopOfFunnelConfig {
    pub enable_auto_research: bool,
    pub enable_auto_backlog_creation: bool,
    /// Newborn issues get this long before research triggers.
    pub icebox_research_delay_ms: u64,
    pub min_researched_description_length: usize,
    /// Headers whose presence marks a description as researched.
    pub researched_headers: Vec<String>,
    /// Labels that force research regardless of description quality.
    pub research_request_labels: Vec<String>,
}

impl Default for TopOfFunnelConfig {
    fn default() -> Self {
        Self {
            enable_auto_research: true,
            enable_auto_backlog_creation: true,
            icebox_research_delay_ms: 3_600_000,
            min_researched_description_length: 200,
            researched_headers: vec![
                "## Acceptance Criteria".to_string(),
                "## Technical Approach".to_string(),
                "## Summary".to_string(),
                "## Requirements".to_string(),
            ],
            research_request_labels: vec!["Needs Research".to_string()],
        }
    }
}

/// Shared token bucket settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub capacity: f64,
    pub refill_per_second: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { capacity: 10.0, refill_per_second: 1.0 }
    }
}

/// Auth-failure circuit breaker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerConfig {
    pub failure_threshold: u32,
    pub reset_timeout_ms: u64,
    pub max_reset_timeout_ms: u64,
    pub backoff_multiplier: u32,
    pub auth_error_codes: Vec<u16>,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 2,
            reset_timeout_ms: 60_000,
            max_reset_timeout_ms: 300_000,
            backoff_multiplier: 2,
            auth_error_codes: vec![400, 401, 403],
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
