// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use vj_adapters::Transport;

use crate::lifecycle::LifecycleError;

/// Resolve state directory: VJ_STATE_DIR > XDG_STATE_HOME/vj > ~/.local/state/vj
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("VJ_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("vj"));
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/vj"))
}

fn parsed<T: std::str::FromStr>(var: &str) -> Option<T> {
    std::env::var(var).ok().and_then(|s| s.parse::<T>().ok())
}

/// Default IPC timeout
pub fn ipc_timeout() -> Duration {
    parsed::<u64>("VJ_IPC_TIMEOUT_MS").map(Duration::from_millis).unwrap_or(Duration::from_secs(5))
}

/// TCP port for remote connections. When set, the daemon listens on this port
/// in addition to the Unix socket.
pub fn tcp_port() -> Option<u16> {
    parsed("VJ_TCP_PORT")
}

/// Auth token for TCP connections, checked in the Hello handshake.
pub fn auth_token() -> Option<String> {
    std::env::var("VJ_AUTH_TOKEN").ok().filter(|s| !s.is_empty())
}

/// How long terminal jobs stay queryable
pub fn retention() -> Option<Duration> {
    parsed::<u64>("VJ_RETENTION_SECS").map(Duration::from_secs)
}

/// Plan catalog replacing the built-in one
pub fn plans_file() -> Option<PathBuf> {
    std::env::var("VJ_PLANS_FILE").ok().filter(|s| !s.is_empty()).map(PathBuf::from)
}

/// Command transport (default ssh)
pub fn transport() -> Result<Transport, LifecycleError> {
    match std::env::var("VJ_TRANSPORT") {
        Ok(raw) if !raw.is_empty() => {
            raw.parse().map_err(|reason| LifecycleError::InvalidEnv { var: "VJ_TRANSPORT", reason })
        }
        _ => Ok(Transport::default()),
    }
}

/// Timeout for actions whose plan sets none
pub fn command_timeout_secs() -> Option<u64> {
    parsed("VJ_COMMAND_TIMEOUT_SECS")
}

/// Extra attempts after a command timeout
pub fn timeout_retries() -> Option<u32> {
    parsed("VJ_TIMEOUT_RETRIES")
}

/// Retention sweep interval (default 60s)
pub fn prune_interval() -> Duration {
    parsed::<u64>("VJ_PRUNE_INTERVAL_MS")
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(60))
}
