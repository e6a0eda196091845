// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fmd`: the Foreman governor daemon.

use clap::Parser;
use fm_daemon::adapter::WebhookOnlyAdapter;
use fm_daemon::{lifecycle, DaemonConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "fmd", about = "Foreman governor daemon")]
struct Args {
    /// Path to the TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured listen address.
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match DaemonConfig::load(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("fmd: {err}");
                std::process::exit(1);
            }
        },
        None => DaemonConfig::default(),
    };
    if let Some(listen) = args.listen {
        config.listen_addr = listen;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
            signal_cancel.cancel();
        }
    });

    let adapter = Arc::new(WebhookOnlyAdapter::new());
    if let Err(err) = lifecycle::run(config, adapter, cancel).await {
        tracing::error!(error = %err, "fmd failed");
        std::process::exit(1);
    }
}
