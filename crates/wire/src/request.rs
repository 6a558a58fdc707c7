// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use vj_core::JobId;

/// Request from CLI to daemon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping
    Ping,

    /// Version handshake
    Hello {
        version: String,
        /// Auth token for TCP connections (ignored for Unix socket)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },

    /// Start an operation on a target resource
    Accept {
        operation: String,
        target: String,
        #[serde(default)]
        payload: serde_json::Value,
    },

    /// Snapshot of one job
    Status { job_id: JobId },

    /// All retained jobs
    ListJobs,
}

impl Request {
    /// Polling requests are logged at debug level
    pub fn is_query(&self) -> bool {
        matches!(self, Request::Ping | Request::Status { .. } | Request::ListJobs)
    }
}
