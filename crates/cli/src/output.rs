// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use clap::ValueEnum;
use serde::Serialize;
use vj_core::{Job, StepOutcome};

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Format a duration between two epoch-ms timestamps (e.g. "850ms", "12s", "3m4s")
pub fn format_elapsed_ms(from_ms: u64, to_ms: u64) -> String {
    let ms = to_ms.saturating_sub(from_ms);
    if ms < 1000 {
        return format!("{ms}ms");
    }
    let secs = ms / 1000;
    if secs < 60 {
        format!("{secs}s")
    } else {
        format!("{}m{}s", secs / 60, secs % 60)
    }
}

/// One-job detail view
pub fn format_job(out: &mut (impl Write + ?Sized), job: &Job) {
    let _ = writeln!(out, "{}", job.id);
    let _ = writeln!(out, "  operation: {}", job.operation);
    let _ = writeln!(out, "  target:    {}", job.target);
    let _ = writeln!(out, "  state:     {}", job.state);
    if let (Some(start), Some(end)) = (job.started_at_ms, job.completed_at_ms) {
        let _ = writeln!(out, "  elapsed:   {}", format_elapsed_ms(start, end));
    }
    if let Some(error) = &job.error {
        let _ = writeln!(out, "  error:     {error}");
    }
    if let Some(result) = &job.result {
        let _ = writeln!(out, "  result:    {result}");
    }
    if job.steps.is_empty() {
        return;
    }

    let _ = writeln!(out, "  steps:");
    let name_width = job.steps.iter().map(|s| s.name.len()).max().unwrap_or(0);
    for step in &job.steps {
        let outcome = match &step.outcome {
            StepOutcome::Running => "running".to_string(),
            StepOutcome::Completed => "completed".to_string(),
            StepOutcome::Failed(e) => format!("failed: {e}"),
        };
        let _ = writeln!(
            out,
            "    {:<12}  {:<name_width$}  {}",
            step.phase.to_string(),
            step.name,
            outcome
        );
    }
}

/// Table of jobs, oldest first
pub fn format_job_list(out: &mut (impl Write + ?Sized), jobs: &[Job]) {
    if jobs.is_empty() {
        let _ = writeln!(out, "No jobs");
        return;
    }

    let rows: Vec<[String; 4]> = jobs
        .iter()
        .map(|j| {
            [j.id.to_string(), j.operation.clone(), j.target.to_string(), j.state.to_string()]
        })
        .collect();
    let headers = ["ID", "OPERATION", "TARGET", "STATE"];
    let mut widths = headers.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let line = |cells: [&str; 4]| {
        format!(
            "{:<w0$}  {:<w1$}  {:<w2$}  {}",
            cells[0],
            cells[1],
            cells[2],
            cells[3],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
        )
    };
    let _ = writeln!(out, "{}", line(headers));
    for row in &rows {
        let _ = writeln!(out, "{}", line([row[0].as_str(), row[1].as_str(), row[2].as_str(), row[3].as_str()]));
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
