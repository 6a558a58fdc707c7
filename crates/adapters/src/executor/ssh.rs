// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{document_text, ExecError, RemoteExecutor};
use crate::subprocess::run_with_timeout;
use async_trait::async_trait;
use tokio::process::Command;
use vj_core::RemoteCommand;

/// ssh reserves this exit status for its own failures
const SSH_ERROR_STATUS: i32 = 255;

/// Runs commands over `ssh` in batch mode.
///
/// Keys, known hosts and connection reuse come from the user's ssh
/// configuration.
#[derive(Debug, Clone)]
pub struct SshExecutor {
    program: String,
    options: Vec<String>,
}

impl Default for SshExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl SshExecutor {
    pub fn new() -> Self {
        Self {
            program: "ssh".to_string(),
            options: vec!["-o".into(), "BatchMode=yes".into(), "-o".into(), "ConnectTimeout=5".into()],
        }
    }

    /// Use a different client binary (e.g. a wrapper script).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn build(&self, command: &RemoteCommand) -> Command {
        let mut cmd = Command::new(&self.program);
        // nothing after `--` is parsed as an ssh option
        cmd.args(&self.options).arg("--").arg(&command.host).arg(&command.command);
        cmd
    }
}

#[async_trait]
impl RemoteExecutor for SshExecutor {
    async fn execute(&self, command: &RemoteCommand) -> Result<String, ExecError> {
        tracing::debug!(host = %command.host, command = %command.command, "ssh exec");
        let output = run_with_timeout(self.build(command), command.timeout(), "ssh").await?;
        if output.status.code() == Some(SSH_ERROR_STATUS) {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(host = %command.host, stderr = %stderr.trim(), "ssh connection failed");
            return Err(ExecError::Transport(format!("ssh to {}: {}", command.host, stderr.trim())));
        }
        document_text(output)
    }
}

#[cfg(test)]
#[path = "ssh_tests.rs"]
mod tests;
