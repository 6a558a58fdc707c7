// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Failed steps, compensations and finalizers

use crate::prelude::*;

fn clone_and_wait(temp: &Project, volume: &str) -> RunAssert {
    let volume = format!("volume={volume}");
    temp.vj()
        .args(&["accept", "snapshot.clone", "snap1", "--set", "host=node1", "--set", volume.as_str()])
        .args(&["--wait", "--timeout", "10s"])
        .exits(1)
}

#[test]
fn failed_first_mutation_runs_only_finalizer() {
    let temp = Project::started();
    clone_and_wait(&temp, "taken")
        .stdout_has("failed")
        .stderr_has("clone volume: Volume taken already exists");

    assert_eq!(
        temp.gluster_calls(),
        vec!["snapshot activate snap1", "snapshot clone taken", "snapshot deactivate snap1"]
    );
}

#[test]
fn failed_late_step_compensates_then_finalizes() {
    let temp = Project::started();
    clone_and_wait(&temp, "broken").stderr_has("start volume: Volume broken failed to start");

    assert_eq!(
        temp.gluster_calls(),
        vec![
            "snapshot activate snap1",
            "snapshot clone broken",
            "volume start broken",
            "volume delete broken",
            "snapshot deactivate snap1",
        ]
    );
}

#[test]
fn failed_job_releases_its_target() {
    let temp = Project::started();
    clone_and_wait(&temp, "taken");

    temp.vj()
        .args(&["accept", "snapshot.destroy", "snap1", "--set", "host=node1", "--wait"])
        .passes()
        .stdout_has("completed");
}

#[test]
fn failed_job_status_shows_step_outcomes() {
    let temp = Project::started();
    clone_and_wait(&temp, "broken");

    let jobs = temp.vj().args(&["-o", "json", "jobs"]).passes().json();
    let job = &jobs[0];
    assert_eq!(job["state"], "failed");
    let id = job["id"].as_str().unwrap().to_string();

    temp.vj()
        .args(&["status", &id])
        .passes()
        .stdout_has("compensation")
        .stdout_has("delete volume")
        .stdout_has("finalizer")
        .stdout_has("deactivate snapshot");
}
