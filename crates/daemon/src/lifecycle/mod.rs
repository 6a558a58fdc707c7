// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration, startup and shutdown

mod startup;
pub use startup::startup;

use std::fs::File;
use std::path::PathBuf;

use thiserror::Error;
use tokio::net::{TcpListener, UnixListener};
use tracing::{info, warn};
use vj_adapters::{Transport, TransportExecutor};
use vj_core::SystemClock;
use vj_engine::{Broker, EngineConfig};

use crate::env;
use crate::snapshot::SnapshotError;

/// Broker with the production adapters
pub type DaemonBroker = Broker<TransportExecutor, SystemClock>;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/vj)
    pub state_dir: PathBuf,
    /// Path to Unix socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Path to the jobs snapshot
    pub jobs_path: PathBuf,
    /// Plan catalog file; the built-in catalog when unset
    pub plans_path: Option<PathBuf>,
    pub transport: Transport,
    pub engine: EngineConfig,
    /// Also listen on this TCP port
    pub tcp_port: Option<u16>,
    /// Token TCP clients must present in Hello
    pub auth_token: Option<String>,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// Uses fixed paths under `~/.local/state/vj/` (or `$XDG_STATE_HOME/vj/`).
    pub fn load() -> Result<Self, LifecycleError> {
        let state_dir = env::state_dir()?;
        let mut engine = EngineConfig::default();
        if let Some(secs) = env::command_timeout_secs() {
            engine = engine.default_timeout_secs(secs);
        }
        if let Some(retries) = env::timeout_retries() {
            engine = engine.timeout_retries(retries);
        }
        if let Some(retention) = env::retention() {
            engine = engine.retention(retention);
        }

        Ok(Self {
            plans_path: env::plans_file(),
            transport: env::transport()?,
            engine,
            tcp_port: env::tcp_port(),
            auth_token: env::auth_token(),
            ..Self::in_dir(state_dir)
        })
    }

    /// Configuration rooted at `state_dir` with defaults for everything else.
    pub fn in_dir(state_dir: impl Into<PathBuf>) -> Self {
        let state_dir = state_dir.into();
        Self {
            socket_path: state_dir.join("daemon.sock"),
            lock_path: state_dir.join("daemon.pid"),
            log_path: state_dir.join("daemon.log"),
            jobs_path: state_dir.join("jobs.json"),
            plans_path: None,
            transport: Transport::default(),
            engine: EngineConfig::default(),
            tcp_port: None,
            auth_token: None,
            state_dir,
        }
    }
}

/// Daemon state during operation.
pub struct DaemonState {
    pub config: Config,
    // exclusive lock on the pid file, released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub broker: DaemonBroker,
}

impl DaemonState {
    /// Write out pending commits, then remove the socket and PID files.
    /// Jobs still running are recovered
    /// as interrupted on the next start.
    pub fn shutdown(&self) {
        let in_flight = self.broker.list().iter().filter(|j| !j.is_terminal()).count();
        if in_flight > 0 {
            warn!(in_flight, "shutting down with jobs in flight");
        }
        self.broker.store().sync();

        for path in [&self.config.socket_path, &self.config.lock_path] {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "failed to remove file"),
            }
        }

        info!("daemon stopped");
    }
}

/// Result of daemon startup: the daemon state plus its bound listeners.
pub struct StartupResult {
    pub daemon: DaemonState,
    pub listener: UnixListener,
    pub tcp: Option<TcpListener>,
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("Failed to bind TCP port {0}: {1}")]
    TcpBindFailed(u16, std::io::Error),

    #[error("Invalid {var}: {reason}")]
    InvalidEnv { var: &'static str, reason: String },

    #[error("Plan error: {0}")]
    Plan(#[from] vj_plan::PlanError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
