// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Poll Client: query a job until it is terminal or the deadline passes.
//!
//! Giving up only stops the polling. The job keeps running in the daemon
//! and can be waited on again.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::Instant;
use vj_core::{Job, JobId};

use crate::client::{ClientError, DaemonClient};

/// Anything that can report a job's current state.
#[async_trait]
pub trait JobSource: Send + Sync {
    async fn job(&self, id: &JobId) -> Result<Job, ClientError>;
}

#[async_trait]
impl JobSource for DaemonClient {
    async fn job(&self, id: &JobId) -> Result<Job, ClientError> {
        DaemonClient::job(self, id).await
    }
}

#[derive(Debug, Error)]
pub enum PollError {
    /// Deadline passed; `last` is the final non-terminal snapshot
    #[error("timed out after {}s waiting for {}", .waited.as_secs(), .last.id)]
    Timeout { waited: Duration, last: Box<Job> },

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Exponential backoff between polls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self { initial: Duration::from_millis(250), max: Duration::from_secs(2) }
    }
}

impl Backoff {
    /// Doubles each call, saturating at `max`.
    pub fn next(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max)
    }
}

/// Poll `id` until it reaches a terminal state.
///
/// The last poll happens at the deadline itself, so a job finishing just
/// before the deadline is still observed.
pub async fn wait_for_job<S: JobSource + ?Sized>(
    source: &S,
    id: &JobId,
    timeout: Duration,
    backoff: &Backoff,
) -> Result<Job, PollError> {
    let started = Instant::now();
    let deadline = started + timeout;
    let mut delay = backoff.initial.min(backoff.max);
    loop {
        let job = source.job(id).await?;
        if job.is_terminal() {
            return Ok(job);
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(PollError::Timeout { waited: now - started, last: Box::new(job) });
        }
        tokio::time::sleep(delay.min(deadline - now)).await;
        delay = backoff.next(delay);
    }
}

#[cfg(test)]
#[path = "poll_tests.rs"]
mod tests;
