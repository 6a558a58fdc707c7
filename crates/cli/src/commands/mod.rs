// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod accept;
pub mod job;

use std::time::Duration;

use anyhow::Result;
use vj_wire::ErrorKind;

use crate::client::ClientError;
use crate::exit_error::{ExitError, EXIT_NOT_FOUND, EXIT_REJECTED};

/// Parse a key=value string for payload arguments.
pub(crate) fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let pos = s.find('=').ok_or_else(|| format!("invalid input format '{}': must be key=value", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

/// Parse a human-readable duration string (e.g. "5m", "30s", "1h30m", "1500ms")
pub fn parse_duration(s: &str) -> Result<Duration> {
    let mut total_ms: u64 = 0;
    let mut current_num = String::new();
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_ascii_digit() {
            current_num.push(c);
            continue;
        }
        let n: u64 = current_num.parse().map_err(|_| anyhow::anyhow!("invalid duration: {}", s))?;
        current_num.clear();
        match c {
            'h' => total_ms += n * 3_600_000,
            'm' if chars.peek() == Some(&'s') => {
                chars.next();
                total_ms += n;
            }
            'm' => total_ms += n * 60_000,
            's' => total_ms += n * 1000,
            _ => anyhow::bail!("unknown duration unit '{}' in: {}", c, s),
        }
    }
    // Bare number → seconds
    if !current_num.is_empty() {
        let n: u64 = current_num.parse().map_err(|_| anyhow::anyhow!("invalid duration: {}", s))?;
        total_ms += n * 1000;
    }
    if total_ms == 0 {
        anyhow::bail!("duration must be > 0: {}", s);
    }
    Ok(Duration::from_millis(total_ms))
}

/// Map daemon rejections onto exit codes; other failures stay plain errors.
pub(crate) fn client_failure(e: ClientError) -> anyhow::Error {
    match e.kind() {
        Some(ErrorKind::NotFound) => ExitError::new(EXIT_NOT_FOUND, e.to_string()).into(),
        Some(ErrorKind::Validation | ErrorKind::Conflict) => {
            ExitError::new(EXIT_REJECTED, e.to_string()).into()
        }
        Some(ErrorKind::Internal) | None => e.into(),
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
