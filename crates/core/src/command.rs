// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote command and decoded result units.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One command submitted to a remote executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCommand {
    /// Host reference resolved by the transport (hostname, node id, pod name)
    pub host: String,
    /// Fully interpolated command line
    pub command: String,
    /// Upper bound on remote execution time
    pub timeout_secs: u64,
}

impl RemoteCommand {
    pub fn new(host: impl Into<String>, command: impl Into<String>, timeout_secs: u64) -> Self {
        Self { host: host.into(), command: command.into(), timeout_secs }
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

/// Decoded outcome of a remote command's structured output.
///
/// `return_code == 0` is success regardless of which auxiliary fields
/// are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResult {
    pub return_code: i32,
    #[serde(default)]
    pub errno: i32,
    #[serde(default)]
    pub error_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl CommandResult {
    pub fn success(payload: Option<Value>) -> Self {
        Self { return_code: 0, errno: 0, error_text: String::new(), payload }
    }

    pub fn is_success(&self) -> bool {
        self.return_code == 0
    }
}
