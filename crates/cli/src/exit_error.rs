// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Custom error type that carries a process exit code.
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! directly, allowing `main()` to handle process termination.

use std::fmt;

/// The job ended in `failed`, or the request could not be sent
pub const EXIT_FAILED: i32 = 1;
/// The wait deadline passed before the job finished
pub const EXIT_TIMEOUT: i32 = 2;
/// No such job
pub const EXIT_NOT_FOUND: i32 = 3;
/// The daemon refused the request (validation or conflict)
pub const EXIT_REJECTED: i32 = 4;
/// Interrupted with Ctrl-C
pub const EXIT_INTERRUPTED: i32 = 130;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}
