// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vjd: the voljobs daemon
//!
//! Accepts storage operations over a Unix socket (and optionally TCP),
//! runs them as jobs against the storage hosts, and answers status polls.

mod env;
mod lifecycle;
mod listener;
mod snapshot;

use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::lifecycle::{Config, DaemonBroker};
use crate::listener::{ListenCtx, Listener};

fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    std::fs::create_dir_all(&config.state_dir)
        .with_context(|| format!("creating {}", config.state_dir.display()))?;
    let _guard = init_logging(&config)?;

    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    let result = runtime.block_on(run(config));
    if let Err(e) = &result {
        error!("daemon exited with error: {e:#}");
    }
    result
}

/// Log to the daemon log file through a non-blocking writer.
fn init_logging(config: &Config) -> anyhow::Result<WorkerGuard> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
        .with_context(|| format!("opening {}", config.log_path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).with_ansi(false).init();
    Ok(guard)
}

async fn run(config: Config) -> anyhow::Result<()> {
    let started = lifecycle::startup(&config).await?;
    let daemon = started.daemon;

    let ctx = Arc::new(ListenCtx {
        broker: daemon.broker.clone(),
        auth_token: daemon.config.auth_token.clone(),
    });
    let shutdown = CancellationToken::new();
    let listener = Listener::new(started.listener, started.tcp, ctx);
    let listen_task = tokio::spawn(listener.run(shutdown.clone()));
    let prune_task = tokio::spawn(prune_loop(daemon.broker.clone(), shutdown.clone()));

    // Readiness marker for supervisors
    println!("READY");

    wait_for_signal().await;
    info!("shutdown requested");
    shutdown.cancel();
    let _ = listen_task.await;
    let _ = prune_task.await;

    daemon.shutdown();
    Ok(())
}

/// Periodically drop terminal jobs past the retention window.
async fn prune_loop(broker: DaemonBroker, shutdown: CancellationToken) {
    let mut interval = tokio::time::interval(env::prune_interval());
    interval.tick().await;
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {
                broker.prune();
            }
        }
    }
}

async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(e) => {
            error!("cannot install SIGTERM handler: {}", e);
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}
