// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI.

use std::path::PathBuf;
use std::time::Duration;

/// Resolve state directory: VJ_STATE_DIR > XDG_STATE_HOME/vj > ~/.local/state/vj
pub fn state_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("VJ_STATE_DIR") {
        return Some(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Some(PathBuf::from(xdg).join("vj"));
    }
    let home = std::env::var("HOME").ok()?;
    Some(PathBuf::from(home).join(".local/state/vj"))
}

/// Remote daemon (`host:port`); the local socket is used when unset
pub fn daemon_addr() -> Option<String> {
    std::env::var("VJ_DAEMON_ADDR").ok().filter(|s| !s.is_empty())
}

pub fn auth_token() -> Option<String> {
    std::env::var("VJ_AUTH_TOKEN").ok().filter(|s| !s.is_empty())
}

/// Per-request IPC timeout
pub fn ipc_timeout() -> Duration {
    std::env::var("VJ_IPC_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}

/// First poll interval override for `wait`
pub fn wait_poll() -> Option<Duration> {
    std::env::var("VJ_WAIT_POLL_MS").ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}
