// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use vj_core::{Job, JobId};

/// Category of a rejected request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed request; nothing was executed
    Validation,
    /// Target resource is held by an in-flight job
    Conflict,
    NotFound,
    Internal,
}

vj_core::simple_display! {
    ErrorKind {
        Validation => "validation",
        Conflict => "conflict",
        NotFound => "not_found",
        Internal => "internal",
    }
}

/// Response from daemon to CLI
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Health check response
    Pong,

    /// Version handshake response
    Hello { version: String },

    /// Operation accepted; poll `Status` with this ID
    Accepted { job_id: JobId },

    /// Single job snapshot
    Job { job: Box<Job> },

    /// List of jobs, oldest first
    Jobs { jobs: Vec<Job> },

    /// Error response
    Error { kind: ErrorKind, message: String },
}

impl Response {
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Response::Error { kind, message: message.into() }
    }
}
