// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn sh(script: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(script);
    cmd
}

#[tokio::test]
async fn captures_stdout_and_status() {
    let output = run_with_timeout(sh("echo hi; exit 3"), Duration::from_secs(5), "test").await.unwrap();
    assert_eq!(String::from_utf8_lossy(&output.stdout), "hi\n");
    assert_eq!(output.status.code(), Some(3));
}

#[tokio::test]
async fn slow_command_times_out() {
    let err = run_with_timeout(sh("sleep 5"), Duration::from_millis(50), "test").await.unwrap_err();
    assert!(matches!(err, SubprocessError::TimedOut(d) if d == Duration::from_millis(50)));
}

#[tokio::test]
async fn missing_binary_is_spawn_error() {
    let cmd = Command::new("/nonexistent/vj-test-binary");
    let err = run_with_timeout(cmd, Duration::from_secs(1), "test").await.unwrap_err();
    assert!(matches!(err, SubprocessError::Spawn(_)));
}
