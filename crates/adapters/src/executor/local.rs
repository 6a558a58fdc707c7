// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{document_text, ExecError, RemoteExecutor};
use crate::subprocess::run_with_timeout;
use async_trait::async_trait;
use tokio::process::Command;
use vj_core::RemoteCommand;

/// Runs commands through `sh -c` on this machine; the host is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalExecutor;

#[async_trait]
impl RemoteExecutor for LocalExecutor {
    async fn execute(&self, command: &RemoteCommand) -> Result<String, ExecError> {
        tracing::debug!(command = %command.command, "local exec");
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(&command.command);
        let output = run_with_timeout(cmd, command.timeout(), "local").await?;
        document_text(output)
    }
}
