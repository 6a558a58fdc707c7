// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Jobs cut off by a daemon crash

use crate::prelude::*;

/// Kill the daemon while a clone is still running, then restart it.
fn crash_mid_clone(temp: &mut Project) -> String {
    let id = temp
        .vj()
        .args(&["accept", "snapshot.clone", "snap1", "--set", "host=node1", "--set", "volume=slow"])
        .passes()
        .stdout()
        .trim()
        .to_string();

    let running = wait_for(SPEC_WAIT_MAX_MS, || {
        temp.gluster_calls().iter().any(|c| c == "snapshot clone slow")
    });
    assert!(running, "job should reach the clone step");
    let persisted = wait_for(SPEC_WAIT_MAX_MS, || temp.snapshot_text().contains("clone volume"));
    assert!(persisted, "running clone step should be on disk");

    assert!(temp.daemon_kill(), "daemon should be killed");
    temp.start_daemon();
    id
}

#[test]
fn interrupted_job_is_failed_on_restart() {
    let mut temp = Project::empty();
    temp.start_daemon();
    let id = crash_mid_clone(&mut temp);

    temp.vj()
        .args(&["status", &id])
        .passes()
        .stdout_has("failed")
        .stdout_has("interrupted: daemon restarted during step clone volume");
}

#[test]
fn restart_replays_finalizers_of_completed_steps() {
    let mut temp = Project::empty();
    temp.start_daemon();
    crash_mid_clone(&mut temp);

    let calls = temp.gluster_calls();
    assert_eq!(calls.last().map(String::as_str), Some("snapshot deactivate snap1"), "{calls:?}");
    // the interrupted clone step never registered its compensation
    assert!(!calls.iter().any(|c| c.starts_with("volume delete")), "{calls:?}");
}

#[test]
fn recovered_job_no_longer_holds_its_target() {
    let mut temp = Project::empty();
    temp.start_daemon();
    crash_mid_clone(&mut temp);

    temp.vj()
        .args(&["accept", "snapshot.destroy", "snap1", "--set", "host=node1", "--wait"])
        .passes()
        .stdout_has("completed");
}

#[test]
fn wait_on_interrupted_job_exits_failed() {
    let mut temp = Project::empty();
    temp.start_daemon();
    let id = crash_mid_clone(&mut temp);

    temp.vj().args(&["wait", &id]).exits(1).stderr_has("interrupted");
}
