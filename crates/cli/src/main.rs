// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vj: command-line client for the voljobs daemon

mod client;
mod commands;
mod env;
mod exit_error;
mod output;
mod poll;

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use vj_core::JobId;

use crate::client::DaemonClient;
use crate::commands::{parse_duration, parse_key_value};
use crate::exit_error::ExitError;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "vj", version, about = "Run storage volume and snapshot operations")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start an operation on a target resource
    Accept {
        /// Operation type (e.g. snapshot.clone)
        operation: String,

        /// Target resource (volume or snapshot name)
        target: String,

        /// Payload field (can be repeated: --set key=value)
        #[arg(long = "set", value_parser = parse_key_value)]
        set: Vec<(String, String)>,

        /// Wait for the job to finish
        #[arg(long)]
        wait: bool,

        /// Wait timeout (e.g. "5m", "30s"); implies --wait
        #[arg(long, value_parser = parse_duration)]
        timeout: Option<Duration>,
    },
    /// Show one job
    Status {
        /// Job ID
        id: String,
    },
    /// Block until a job reaches a terminal state
    Wait {
        /// Job ID
        id: String,

        /// Timeout duration (e.g. "5m", "30s", "1h")
        #[arg(long, value_parser = parse_duration)]
        timeout: Option<Duration>,
    },
    /// List retained jobs
    Jobs,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        if let Some(exit) = e.downcast_ref::<ExitError>() {
            eprintln!("Error: {}", exit.message);
            std::process::exit(exit.code);
        }
        eprintln!("Error: {e:#}");
        std::process::exit(exit_error::EXIT_FAILED);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let client = DaemonClient::from_env()?;
    let format = cli.output;

    match cli.command {
        Command::Accept { operation, target, set, wait, timeout } => {
            let wait = match (wait, timeout) {
                (_, Some(timeout)) => Some(timeout),
                (true, None) => Some(commands::job::DEFAULT_WAIT_TIMEOUT),
                (false, None) => None,
            };
            commands::accept::handle(&client, &operation, &target, &set, wait, format).await
        }
        Command::Status { id } => commands::job::status(&client, &id, format).await,
        Command::Wait { id, timeout } => {
            let timeout = timeout.unwrap_or(commands::job::DEFAULT_WAIT_TIMEOUT);
            commands::job::wait(&client, &JobId::from_string(id), timeout, format).await
        }
        Command::Jobs => commands::job::jobs(&client, format).await,
    }
}
