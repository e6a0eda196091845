// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;

#[test]
fn defaults_are_sane() {
    let config = DaemonConfig::default();
    assert_eq!(config.listen_addr, "127.0.0.1:7433");
    assert_eq!(config.worker_lease_ms, 60_000);
}

#[test]
fn load_fills_defaults_for_missing_sections() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
listen_addr = "0.0.0.0:9000"

[governor]
projects = ["platform"]
worker_auth_token = "tok"
"#
    )
    .unwrap();
    let config = DaemonConfig::load(file.path()).unwrap();
    assert_eq!(config.listen_addr, "0.0.0.0:9000");
    assert_eq!(config.governor.projects, vec!["platform"]);
    assert_eq!(config.governor.dedup_window_ms, 10_000);
    assert_eq!(config.log_filter, "info");
}

#[test]
fn load_surfaces_parse_errors() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "listen_addr = [not toml").unwrap();
    assert!(matches!(
        DaemonConfig::load(file.path()),
        Err(DaemonError::ConfigParse { .. })
    ));
}

#[test]
fn load_surfaces_missing_file() {
    assert!(matches!(
        DaemonConfig::load(std::path::Path::new("/nonexistent/fmd.toml")),
        Err(DaemonError::ConfigRead { .. })
    ));
}
