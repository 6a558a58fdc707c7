// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Accepting operations and inspecting the resulting jobs

use crate::prelude::*;

fn accept_clone(temp: &Project, target: &str, volume: &str) -> String {
    let volume = format!("volume={volume}");
    temp.vj()
        .args(&["accept", "snapshot.clone", target, "--set", "host=node1", "--set", volume.as_str()])
        .passes()
        .stdout()
        .trim()
        .to_string()
}

#[test]
fn accept_prints_job_id_and_job_completes() {
    let temp = Project::started();
    let id = accept_clone(&temp, "snap1", "clone1");
    assert!(id.starts_with("job-"), "unexpected id {id:?}");

    let done = wait_for(SPEC_WAIT_MAX_MS, || {
        temp.vj().args(&["status", &id]).passes().stdout().contains("completed")
    });
    assert!(done, "job should complete");

    temp.vj()
        .args(&["status", &id])
        .passes()
        .stdout_has("snapshot.clone")
        .stdout_has("snap1")
        .stdout_has("clone volume")
        .stdout_has("\"name\":\"clone1\"");

    assert_eq!(
        temp.gluster_calls(),
        vec![
            "snapshot activate snap1",
            "snapshot clone clone1",
            "volume start clone1",
            "snapshot deactivate snap1",
        ]
    );
}

#[test]
fn accept_json_output_carries_job_id() {
    let temp = Project::started();
    let run = temp
        .vj()
        .args(&["-o", "json", "accept", "snapshot.info", "snap1", "--set", "host=node1"])
        .passes();
    let id = run.json()["job_id"].as_str().unwrap().to_string();
    assert!(id.starts_with("job-"));
}

#[test]
fn jobs_lists_accepted_jobs() {
    let temp = Project::started();
    temp.vj().args(&["jobs"]).passes().stdout_has("No jobs");

    let id = accept_clone(&temp, "snap1", "clone1");
    temp.vj()
        .args(&["jobs"])
        .passes()
        .stdout_has("OPERATION")
        .stdout_has(&id)
        .stdout_has("snapshot.clone");
}

#[test]
fn status_of_unknown_job_exits_not_found() {
    let temp = Project::started();
    temp.vj().args(&["status", "job-missing"]).exits(3).stderr_has("job not found");
}

#[yare::parameterized(
    unknown_operation = { &["accept", "volume.resize", "vol1"], "unknown operation" },
    missing_field     = { &["accept", "snapshot.clone", "snap1", "--set", "host=node1"], "volume" },
    unknown_field     = { &["accept", "snapshot.destroy", "snap1", "--set", "host=node1", "--set", "color=red"], "color" },
    shell_metachar    = { &["accept", "snapshot.destroy", "snap1", "--set", "host=node1;rm"], "invalid character" },
    unsupported       = { &["accept", "block.clone", "blk1"], "not supported" },
)]
fn invalid_requests_are_rejected(args: &[&str], message: &str) {
    let temp = Project::started();
    temp.vj().args(args).exits(4).stderr_has(message);
    assert!(temp.gluster_calls().is_empty(), "rejected requests must not run commands");
}

#[test]
fn second_job_on_busy_target_conflicts() {
    let temp = Project::started();
    let first = accept_clone(&temp, "snap1", "slow");
    let started = wait_for(SPEC_WAIT_MAX_MS, || {
        temp.gluster_calls().iter().any(|c| c == "snapshot clone slow")
    });
    assert!(started, "first job should reach the clone step");

    temp.vj()
        .args(&["accept", "snapshot.destroy", "snap1", "--set", "host=node1"])
        .exits(4)
        .stderr_has("is locked by")
        .stderr_has(&first);

    // other targets are unaffected
    accept_clone(&temp, "snap2", "clone2");
}
