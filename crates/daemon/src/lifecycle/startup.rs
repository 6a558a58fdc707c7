// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup and initialization logic.

use std::io::Write;

use fs2::FileExt;
use tokio::net::{TcpListener, UnixListener};
use tracing::{info, warn};
use vj_adapters::TransportExecutor;
use vj_core::SystemClock;
use vj_engine::{Broker, EngineDeps, JobStore};
use vj_plan::{builtin_catalog, PlanCatalog};

use crate::snapshot::{load_snapshot, SnapshotWriter};

use super::{Config, DaemonState, LifecycleError, StartupResult};

/// Start the daemon
pub async fn startup(config: &Config) -> Result<StartupResult, LifecycleError> {
    match startup_inner(config).await {
        Ok(result) => Ok(result),
        Err(e) => {
            // Lock not acquired: these files belong to the
            // daemon that holds it.
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

async fn startup_inner(config: &Config) -> Result<StartupResult, LifecycleError> {
    // 1. Create state directory
    std::fs::create_dir_all(&config.state_dir)?;

    // 2. Acquire lock file FIRST - prevents races.
    // Open without truncating so a running daemon's PID survives a failed attempt.
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;

    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    // 3. Plans
    let catalog = match &config.plans_path {
        Some(path) => PlanCatalog::load(path)?,
        None => builtin_catalog()?,
    };
    info!(operations = catalog.len(), "loaded plan catalog");

    // 4. Load jobs from snapshot
    let snapshots = SnapshotWriter::new(&config.jobs_path);
    let loaded = load_snapshot(snapshots.path())?;
    let store = JobStore::new(snapshots)?;
    match loaded {
        Some(snapshot) => {
            info!(jobs = snapshot.jobs.len(), created_at = %snapshot.created_at, "loaded snapshot");
            store.restore(snapshot.jobs);
        }
        None => info!("No snapshot found, starting with empty state"),
    }

    let deps = EngineDeps {
        executor: TransportExecutor::new(config.transport),
        clock: SystemClock,
        store,
    };
    let broker = Broker::new(deps, catalog, config.engine.clone());

    // 5. Resolve jobs the previous run left in flight. Runs before the
    // socket is bound, so no request can race a recovering job.
    let report = broker.recover().await;
    for (job_id, error) in &report.errors {
        warn!(job_id = %job_id, error = %error, "job left unrecovered");
    }
    let pruned = broker.prune();
    if pruned > 0 {
        info!(pruned, "pruned expired jobs");
    }
    broker.store().sync();

    // 6. Remove stale socket and bind (LAST - only after all validation passes)
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    let tcp = match config.tcp_port {
        Some(port) => {
            if config.auth_token.is_none() {
                warn!(port, "TCP listener enabled without VJ_AUTH_TOKEN");
            }
            let tcp = TcpListener::bind(("0.0.0.0", port))
                .await
                .map_err(|e| LifecycleError::TcpBindFailed(port, e))?;
            Some(tcp)
        }
        None => None,
    };

    info!(
        socket = %config.socket_path.display(),
        transport = %config.transport,
        jobs = broker.store().len(),
        "daemon started"
    );

    Ok(StartupResult {
        daemon: DaemonState { config: config.clone(), lock_file, broker },
        listener,
        tcp,
    })
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config) {
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;
