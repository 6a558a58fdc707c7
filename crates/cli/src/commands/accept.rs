// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vj accept` - start an operation

use std::time::Duration;

use anyhow::Result;
use serde_json::{Map, Value};

use crate::client::DaemonClient;
use crate::output::{print_json, OutputFormat};

use super::client_failure;

/// Build the request payload from `--set key=value` pairs. Later pairs win.
pub(crate) fn payload_from_pairs(pairs: &[(String, String)]) -> Value {
    let map: Map<String, Value> =
        pairs.iter().map(|(k, v)| (k.clone(), Value::String(v.clone()))).collect();
    Value::Object(map)
}

pub async fn handle(
    client: &DaemonClient,
    operation: &str,
    target: &str,
    set: &[(String, String)],
    wait: Option<Duration>,
    format: OutputFormat,
) -> Result<()> {
    let job_id =
        client.accept(operation, target, payload_from_pairs(set)).await.map_err(client_failure)?;

    match wait {
        Some(timeout) => {
            if format == OutputFormat::Text {
                eprintln!("Accepted {job_id}, waiting...");
            }
            super::job::wait(client, &job_id, timeout, format).await
        }
        None => {
            match format {
                OutputFormat::Text => println!("{job_id}"),
                OutputFormat::Json => print_json(&serde_json::json!({ "job_id": job_id }))?,
            }
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "accept_tests.rs"]
mod tests;
