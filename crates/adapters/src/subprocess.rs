// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded subprocess execution

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Outcome of a subprocess that did not complete normally.
#[derive(Debug)]
pub enum SubprocessError {
    Spawn(std::io::Error),
    TimedOut(Duration),
}

/// Run `cmd` to completion, killing it if it outlives `timeout`.
///
/// stdin is closed so a command can never block on a prompt.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    label: &str,
) -> Result<Output, SubprocessError> {
    cmd.stdin(std::process::Stdio::null()).kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => {
            tracing::error!(label, error = %e, "failed to spawn subprocess");
            Err(SubprocessError::Spawn(e))
        }
        Err(_) => {
            // dropping the output future kills the child
            tracing::warn!(label, timeout_ms = timeout.as_millis() as u64, "subprocess timed out");
            Err(SubprocessError::TimedOut(timeout))
        }
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
