// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: wire, serve, reap, shut down.

use fm_core::SystemClock;
use fm_governor::{EventBus, Governor, PlatformAdapter};
use fm_store::Store;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::DaemonConfig;
use crate::error::DaemonError;
use crate::server::{router, AppState};

/// Run the daemon until the cancellation token fires.
pub async fn run(
    config: DaemonConfig,
    adapter: Arc<dyn PlatformAdapter>,
    cancel: CancellationToken,
) -> Result<(), DaemonError> {
    let clock = SystemClock;
    let store = Arc::new(Store::new(clock.clone()));
    let bus = EventBus::new();
    let governor = Arc::new(Governor::new(
        config.governor.clone(),
        clock,
        store.clone(),
        bus.clone(),
        adapter,
    ));

    // Governor loop: the single bus subscriber.
    let loop_governor = governor.clone();
    let loop_cancel = cancel.clone();
    let governor_task = tokio::spawn(async move { loop_governor.run(loop_cancel).await });

    // Poll sweep (no-op unless enabled and configured).
    let sweep_task = tokio::spawn(fm_governor::run_poll_sweep(governor.clone(), cancel.clone()));

    // Stale-worker reaper + TTL sweep.
    let reaper_task = tokio::spawn(run_reaper(
        store.clone(),
        config.worker_lease_ms,
        config.reaper_interval_ms,
        cancel.clone(),
    ));

    let state = Arc::new(AppState::new(governor.clone(), config.worker_lease_ms));
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|source| DaemonError::Bind { addr: config.listen_addr.clone(), source })?;
    tracing::info!(addr = %config.listen_addr, "fmd listening");

    let serve_cancel = cancel.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { serve_cancel.cancelled().await })
        .await?;

    // Close the bus so the loop drains and exits, then join the tasks.
    bus.close();
    cancel.cancel();
    let loop_result = governor_task.await;
    let _ = sweep_task.await;
    let _ = reaper_task.await;
    if let Ok(result) = loop_result {
        result?;
    }
    tracing::info!("fmd stopped");
    Ok(())
}

/// Periodic recovery: reap dead workers (re-queueing their claimed work)
/// and prune expired records.
async fn run_reaper(
    store: Arc<Store<SystemClock>>,
    lease_ms: u64,
    interval_ms: u64,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = ticker.tick() => {
                let summary = store.reap_stale_workers(lease_ms);
                if summary.workers_removed > 0 {
                    tracing::warn!(
                        workers = summary.workers_removed,
                        requeued = summary.sessions_requeued,
                        failed = summary.sessions_failed,
                        "reaped stale workers"
                    );
                }
                store.sweep_expired();
            }
        }
    }
}
