// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine error taxonomy

use crate::parser::ParseError;
use std::time::Duration;
use thiserror::Error;
use vj_core::{JobId, ResourceId};

/// Errors returned synchronously from accept and status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("conflict: {target} is locked by {holder}")]
    Conflict { target: ResourceId, holder: JobId },
    #[error("job not found: {0}")]
    NotFound(JobId),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Why a single action failed. Always captured into the job, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    /// The command could not be delivered or its output collected
    #[error("transport error: {0}")]
    Transport(String),
    /// The command ran and reported failure
    #[error("{message}")]
    Application { return_code: i32, errno: i32, message: String },
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Remote outcome unknown
    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

impl StepError {
    pub(crate) fn application(return_code: i32, errno: i32, text: &str) -> Self {
        let message = if text.is_empty() {
            format!("command failed with return code {return_code} (errno {errno})")
        } else {
            text.to_string()
        };
        StepError::Application { return_code, errno, message }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, StepError::Timeout(_))
    }
}

impl From<vj_adapters::ExecError> for StepError {
    fn from(e: vj_adapters::ExecError) -> Self {
        match e {
            vj_adapters::ExecError::Transport(msg) => StepError::Transport(msg),
            vj_adapters::ExecError::Timeout(d) => StepError::Timeout(d),
        }
    }
}
