// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup, persistence and single-instance locking

use std::process::Command;

use assert_cmd::cargo::CommandCargoExt;

use crate::prelude::*;

#[test]
fn daemon_writes_pid_and_log() {
    let temp = Project::started();
    let pid = std::fs::read_to_string(temp.state_dir().join("daemon.pid")).unwrap();
    assert!(pid.trim().parse::<u32>().is_ok(), "pid file holds {pid:?}");
    assert!(temp.state_dir().join("daemon.log").exists());
}

#[test]
fn second_daemon_refuses_to_start() {
    let temp = Project::started();
    let status = Command::cargo_bin("vjd")
        .unwrap()
        .env("VJ_STATE_DIR", temp.state_dir())
        .env("VJ_TRANSPORT", "local")
        .output()
        .unwrap();
    assert!(!status.status.success(), "second daemon should exit with an error");

    // the running daemon still answers
    temp.vj().args(&["jobs"]).passes();
}

#[test]
fn completed_jobs_survive_restart() {
    let mut temp = Project::started();
    let id = temp
        .vj()
        .args(&["accept", "snapshot.destroy", "snap1", "--set", "host=node1", "--wait"])
        .passes()
        .stdout()
        .lines()
        .next()
        .unwrap()
        .to_string();

    let persisted = wait_for(SPEC_WAIT_MAX_MS, || {
        temp.persisted_state(&id).as_deref() == Some("completed")
    });
    assert!(persisted, "completed state should be on disk");
    assert!(temp.daemon_kill());
    temp.start_daemon();

    temp.vj().args(&["status", &id]).passes().stdout_has("completed");
    assert!(temp.state_dir().join("jobs.json").exists());
}

#[test]
fn invalid_transport_fails_startup() {
    let temp = Project::empty();
    let output = Command::cargo_bin("vjd")
        .unwrap()
        .env("VJ_STATE_DIR", temp.state_dir())
        .env("VJ_TRANSPORT", "carrier-pigeon")
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(!temp.socket_path().exists());
}
