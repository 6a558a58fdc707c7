// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness for the end-to-end specs

#![allow(dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::time::{Duration, Instant};

use assert_cmd::cargo::CommandCargoExt;
use tempfile::TempDir;

/// Upper bound for any condition a spec waits on
pub const SPEC_WAIT_MAX_MS: u64 = 10_000;

/// Fake gluster CLI. Every call is appended to `calls.log` next to it.
///
/// Volume names steer the outcome: `taken` fails the clone, `broken`
/// fails the start, `slow` makes the clone hang long enough to kill the
/// daemon mid-step.
const FAKE_GLUSTER: &str = r#"#!/bin/sh
echo "$3 $4 $5" >> "$(dirname "$0")/calls.log"
case "$3 $4" in
  "snapshot clone")
    case "$5" in
      taken) echo '{"version":1,"op_ret":-1,"op_errno":30806,"op_errstr":"Volume taken already exists"}'; exit 1 ;;
      slow) sleep 30 ;;
    esac
    echo '{"version":1,"op_ret":0,"op_errno":0,"op_errstr":""}'
    ;;
  "volume start")
    if [ "$5" = "broken" ]; then
      echo '{"version":1,"op_ret":-1,"op_errno":2,"op_errstr":"Volume broken failed to start"}'
      exit 1
    fi
    echo '{"version":1,"op_ret":0,"payload":{"volume":{"name":"'"$5"'","status":"Started"}}}'
    ;;
  "snapshot info")
    echo '{"version":1,"op_ret":0,"payload":{"snapshots":[{"name":"'"$5"'","volume":"vol1"}]}}'
    ;;
  *)
    echo '{"version":1,"op_ret":0,"op_errno":0,"op_errstr":""}'
    ;;
esac
"#;

/// Poll `check` until it holds or `max_ms` passes.
pub fn wait_for(max_ms: u64, mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(max_ms);
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    check()
}

/// Isolated state dir and fake-tool dir, plus the daemon if one is running.
pub struct Project {
    dir: TempDir,
    daemon: Option<Child>,
}

impl Project {
    pub fn empty() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("state")).unwrap();
        std::fs::create_dir_all(dir.path().join("bin")).unwrap();
        let script = dir.path().join("bin/gluster");
        std::fs::write(&script, FAKE_GLUSTER).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        Self { dir, daemon: None }
    }

    /// Project with a daemon already accepting connections.
    pub fn started() -> Self {
        let mut project = Self::empty();
        project.start_daemon();
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn state_dir(&self) -> PathBuf {
        self.dir.path().join("state")
    }

    pub fn socket_path(&self) -> PathBuf {
        self.state_dir().join("daemon.sock")
    }

    fn search_path(&self) -> String {
        let bin = self.dir.path().join("bin");
        match std::env::var("PATH") {
            Ok(path) => format!("{}:{path}", bin.display()),
            Err(_) => bin.display().to_string(),
        }
    }

    pub fn start_daemon(&mut self) {
        // a killed daemon leaves its socket behind
        let _ = std::fs::remove_file(self.socket_path());
        let child = Command::cargo_bin("vjd")
            .unwrap()
            .env("VJ_STATE_DIR", self.state_dir())
            .env("VJ_TRANSPORT", "local")
            .env("PATH", self.search_path())
            .env_remove("VJ_TCP_PORT")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .unwrap();
        self.daemon = Some(child);

        let socket = self.socket_path();
        assert!(wait_for(SPEC_WAIT_MAX_MS, || socket.exists()), "daemon socket never appeared");
    }

    /// SIGKILL the daemon; nothing gets to clean up.
    pub fn daemon_kill(&mut self) -> bool {
        match self.daemon.take() {
            Some(mut child) => {
                let killed = child.kill().is_ok();
                let _ = child.wait();
                killed
            }
            None => false,
        }
    }

    /// `vj` pointed at this project's daemon.
    pub fn vj(&self) -> VjCommand {
        let mut cmd = Command::cargo_bin("vj").unwrap();
        cmd.env("VJ_STATE_DIR", self.state_dir())
            .env("VJ_WAIT_POLL_MS", "10")
            .env_remove("VJ_DAEMON_ADDR")
            .env_remove("VJ_AUTH_TOKEN");
        VjCommand { cmd }
    }

    /// Raw contents of the daemon's job snapshot
    pub fn snapshot_text(&self) -> String {
        std::fs::read_to_string(self.state_dir().join("jobs.json")).unwrap_or_default()
    }

    /// State of job `id` as last written to the snapshot
    pub fn persisted_state(&self, id: &str) -> Option<String> {
        let snapshot: serde_json::Value = serde_json::from_str(&self.snapshot_text()).ok()?;
        snapshot["jobs"]
            .as_array()?
            .iter()
            .find(|job| job["id"] == id)
            .and_then(|job| job["state"].as_str().map(str::to_string))
    }

    /// Lines the fake gluster logged, as "<noun> <verb> <name>".
    pub fn gluster_calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.dir.path().join("bin/calls.log"))
            .unwrap_or_default()
            .lines()
            .map(|l| l.trim().to_string())
            .collect()
    }
}

impl Drop for Project {
    fn drop(&mut self) {
        self.daemon_kill();
    }
}

/// `vj` with no daemon configuration at all.
pub fn cli() -> VjCommand {
    let mut cmd = Command::cargo_bin("vj").unwrap();
    cmd.env_remove("VJ_DAEMON_ADDR");
    VjCommand { cmd }
}

pub struct VjCommand {
    cmd: Command,
}

impl VjCommand {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<std::ffi::OsStr>) -> Self {
        self.cmd.env(key, value);
        self
    }

    pub fn run(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        RunAssert { output }
    }

    /// Run and require exit 0.
    pub fn passes(self) -> RunAssert {
        let run = self.run();
        assert_eq!(run.code(), 0, "expected success\n{}", run.describe());
        run
    }

    /// Run and require exit `code`.
    pub fn exits(self, code: i32) -> RunAssert {
        let run = self.run();
        assert_eq!(run.code(), code, "unexpected exit code\n{}", run.describe());
        run
    }
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn code(&self) -> i32 {
        self.output.status.code().unwrap_or(-1)
    }

    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout().contains(needle), "stdout missing {needle:?}\n{}", self.describe());
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr().contains(needle), "stderr missing {needle:?}\n{}", self.describe());
        self
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout()).unwrap()
    }

    fn describe(&self) -> String {
        format!("code: {}\nstdout:\n{}\nstderr:\n{}", self.code(), self.stdout(), self.stderr())
    }
}
