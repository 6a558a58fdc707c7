// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI behavior without a usable daemon

use crate::prelude::*;

#[test]
fn status_without_daemon_reports_not_running() {
    let temp = Project::empty();
    temp.vj().args(&["status", "job-nope"]).exits(1).stderr_has("daemon not running");
}

#[test]
fn malformed_set_pair_is_a_usage_error() {
    let temp = Project::empty();
    temp.vj()
        .args(&["accept", "snapshot.clone", "snap1", "--set", "novalue"])
        .exits(2)
        .stderr_has("key=value");
}

#[test]
fn bad_timeout_is_a_usage_error() {
    let temp = Project::empty();
    temp.vj().args(&["wait", "job-x", "--timeout", "soon"]).exits(2);
}
