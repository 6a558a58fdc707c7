// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote Executor: one command, one host, bounded time

mod local;
mod ssh;

pub use local::LocalExecutor;
pub use ssh::SshExecutor;

use crate::subprocess::SubprocessError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::process::Output;
use std::time::Duration;
use thiserror::Error;
use vj_core::RemoteCommand;

/// Failure to obtain a command's output.
///
/// Neither variant says anything about what happened on the remote side:
/// the command may or may not have run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

impl From<SubprocessError> for ExecError {
    fn from(e: SubprocessError) -> Self {
        match e {
            SubprocessError::Spawn(e) => ExecError::Transport(e.to_string()),
            SubprocessError::TimedOut(d) => ExecError::Timeout(d),
        }
    }
}

/// Runs a command on a storage node and returns its raw output.
#[async_trait]
pub trait RemoteExecutor: Clone + Send + Sync + 'static {
    async fn execute(&self, command: &RemoteCommand) -> Result<String, ExecError>;
}

/// Production transport selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Ssh,
    Local,
}

impl std::str::FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ssh" => Ok(Transport::Ssh),
            "local" => Ok(Transport::Local),
            other => Err(format!("unknown transport {other:?} (expected ssh or local)")),
        }
    }
}

vj_core::simple_display! {
    Transport {
        Ssh => "ssh",
        Local => "local",
    }
}

/// Executor chosen at startup from a [`Transport`].
#[derive(Debug, Clone)]
pub enum TransportExecutor {
    Ssh(SshExecutor),
    Local(LocalExecutor),
}

impl TransportExecutor {
    pub fn new(transport: Transport) -> Self {
        match transport {
            Transport::Ssh => TransportExecutor::Ssh(SshExecutor::new()),
            Transport::Local => TransportExecutor::Local(LocalExecutor),
        }
    }
}

#[async_trait]
impl RemoteExecutor for TransportExecutor {
    async fn execute(&self, command: &RemoteCommand) -> Result<String, ExecError> {
        match self {
            TransportExecutor::Ssh(e) => e.execute(command).await,
            TransportExecutor::Local(e) => e.execute(command).await,
        }
    }
}

/// Convert process output into the raw document text.
///
/// Structured commands report failures in their document, so a non-zero
/// exit with output on stdout is still a delivered result. A non-zero exit
/// with nothing on stdout means the command never produced one.
pub(crate) fn document_text(output: Output) -> Result<String, ExecError> {
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if output.status.success() || !stdout.trim().is_empty() {
        return Ok(stdout);
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    let status = match output.status.code() {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_string(),
    };
    Err(ExecError::Transport(format!("{status}: {}", stderr.trim())))
}

#[cfg(any(test, feature = "test-support"))]
mod fake;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeExecutor, FakeResponse};

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
