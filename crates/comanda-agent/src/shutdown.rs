// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Graceful shutdown: signal handling and draining of in-flight turns.

use std::time::Duration;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Installs handlers for SIGTERM and SIGINT.
///
/// The returned token is cancelled when either signal arrives.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        wait_for_signal().await;
        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "failed to install SIGTERM handler, listening for Ctrl+C only");
            let _ = tokio::signal::ctrl_c().await;
            info!("received SIGINT (Ctrl+C), initiating shutdown");
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("received SIGINT (Ctrl+C), initiating shutdown");
        }
        _ = sigterm.recv() => {
            info!("received SIGTERM, initiating shutdown");
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("received Ctrl+C, initiating shutdown");
}

/// Waits up to `timeout` for in-flight turns, then aborts the rest.
///
/// Returns how many turns were aborted.
pub async fn drain_tasks(tasks: &mut JoinSet<()>, timeout: Duration) -> usize {
    if tasks.is_empty() {
        info!("no in-flight turns to drain");
        return 0;
    }

    info!(count = tasks.len(), "waiting for in-flight turns to complete");

    let drained = tokio::time::timeout(timeout, async {
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                warn!(error = %e, "turn task ended abnormally");
            }
        }
    })
    .await;

    match drained {
        Ok(()) => {
            info!("all turns drained");
            0
        }
        Err(_) => {
            let remaining = tasks.len();
            warn!(remaining, "drain timeout reached, aborting remaining turns");
            tasks.abort_all();
            while tasks.join_next().await.is_some() {}
            remaining
        }
    }
}
