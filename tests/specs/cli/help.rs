// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI help output specs

use crate::prelude::*;

#[test]
fn vj_help_shows_usage() {
    cli().args(&["--help"]).passes().stdout_has("Usage:").stdout_has("accept");
}

#[test]
fn vj_no_args_shows_usage_on_stderr() {
    cli().exits(2).stderr_has("Usage:");
}

#[test]
fn vj_accept_help_lists_flags() {
    cli()
        .args(&["accept", "--help"])
        .passes()
        .stdout_has("--set")
        .stdout_has("--wait")
        .stdout_has("--timeout");
}

#[test]
fn vj_version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("0.1");
}
