// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vj status`, `vj wait`, `vj jobs`

use std::time::Duration;

use anyhow::Result;
use vj_core::{Job, JobId, JobState};

use crate::client::DaemonClient;
use crate::env;
use crate::exit_error::{ExitError, EXIT_FAILED, EXIT_INTERRUPTED, EXIT_TIMEOUT};
use crate::output::{format_job, format_job_list, print_json, OutputFormat};
use crate::poll::{wait_for_job, Backoff, JobSource, PollError};

use super::client_failure;

/// Default `wait` deadline
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(300);

fn print_job(job: &Job, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => format_job(&mut std::io::stdout(), job),
        OutputFormat::Json => print_json(job)?,
    }
    Ok(())
}

pub async fn status(client: &DaemonClient, id: &str, format: OutputFormat) -> Result<()> {
    let job = client.job(&JobId::from_string(id)).await.map_err(client_failure)?;
    print_job(&job, format)
}

pub async fn jobs(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let jobs = client.jobs().await.map_err(client_failure)?;
    match format {
        OutputFormat::Text => format_job_list(&mut std::io::stdout(), &jobs),
        OutputFormat::Json => print_json(&jobs)?,
    }
    Ok(())
}

/// Poll until terminal, print the job, and turn the outcome into an exit code.
///
/// Ctrl-C stops the wait only; the job keeps running in the daemon.
pub async fn wait<S: JobSource + ?Sized>(
    source: &S,
    id: &JobId,
    timeout: Duration,
    format: OutputFormat,
) -> Result<()> {
    let mut backoff = Backoff::default();
    if let Some(initial) = env::wait_poll() {
        backoff.initial = initial;
    }

    let polled = tokio::select! {
        result = wait_for_job(source, id, timeout, &backoff) => result,
        _ = tokio::signal::ctrl_c() => {
            return Err(ExitError::new(
                EXIT_INTERRUPTED,
                format!("interrupted; {id} continues in the daemon"),
            )
            .into());
        }
    };

    let job = match polled {
        Ok(job) => job,
        Err(PollError::Timeout { waited, last }) => {
            print_job(&last, format)?;
            let message = format!(
                "timed out after {}s waiting for {id}; the job is still {}",
                waited.as_secs(),
                last.state
            );
            return Err(ExitError::new(EXIT_TIMEOUT, message).into());
        }
        Err(PollError::Client(e)) => return Err(client_failure(e)),
    };

    print_job(&job, format)?;
    terminal_exit(&job)
}

/// Completed exits 0, Failed exits 1 with the job's error
pub(crate) fn terminal_exit(job: &Job) -> Result<()> {
    match job.state {
        JobState::Failed => {
            let error = job.error.as_deref().unwrap_or("unknown error");
            Err(ExitError::new(EXIT_FAILED, format!("job {} failed: {error}", job.id)).into())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
