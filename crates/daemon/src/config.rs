// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration file.

use fm_core::GovernorConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::DaemonError;

/// `fmd` settings: listen address, log filter, and the governor config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub listen_addr: String,
    /// `tracing_subscriber` env-filter directive, overridable by RUST_LOG.
    pub log_filter: String,
    /// Worker registry lease; workers missing heartbeats this long are
    /// reaped and their work recovered.
    pub worker_lease_ms: u64,
    /// How often the reaper and TTL sweep run.
    pub reaper_interval_ms: u64,
    pub governor: GovernorConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:7433".to_string(),
            log_filter: "info".to_string(),
            worker_lease_ms: 60_000,
            reaper_interval_ms: 15_000,
            governor: GovernorConfig::default(),
        }
    }
}

impl DaemonConfig {
    pub fn load(path: &Path) -> Result<Self, DaemonError> {
        let text = std::fs::read_to_string(path).map_err(|source| DaemonError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| DaemonError::ConfigParse {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
