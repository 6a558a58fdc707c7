// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vj wait` and `vj accept --wait`

use crate::prelude::*;

#[test]
fn accept_wait_prints_completed_job() {
    let temp = Project::started();
    temp.vj()
        .args(&["accept", "snapshot.info", "snap1", "--set", "host=node1", "--wait"])
        .passes()
        .stdout_has("completed")
        .stdout_has("\"volume\":\"vol1\"")
        .stderr_has("Accepted job-");
}

#[test]
fn wait_on_finished_job_returns_immediately() {
    let temp = Project::started();
    let id = temp
        .vj()
        .args(&["accept", "snapshot.destroy", "snap1", "--set", "host=node1"])
        .passes()
        .stdout()
        .trim()
        .to_string();

    let run = temp.vj().args(&["-o", "json", "wait", &id]).passes();
    let job = run.json();
    assert_eq!(job["id"], id.as_str());
    assert_eq!(job["state"], "completed");
    assert_eq!(job["result"], serde_json::json!({}));
}

#[test]
fn wait_times_out_with_exit_two() {
    let temp = Project::started();
    temp.vj()
        .args(&["accept", "snapshot.clone", "snap1", "--set", "host=node1", "--set", "volume=slow"])
        .args(&["--wait", "--timeout", "300ms"])
        .exits(2)
        .stderr_has("timed out")
        .stderr_has("the job is still");
}

#[test]
fn wait_on_unknown_job_exits_not_found() {
    let temp = Project::started();
    temp.vj().args(&["wait", "job-missing", "--timeout", "1s"]).exits(3);
}
