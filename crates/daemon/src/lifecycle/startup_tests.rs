// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::snapshot::Snapshot;
use fs2::FileExt;
use tempfile::tempdir;
use vj_adapters::Transport;
use vj_core::{Job, JobId, JobState, StepOutcome, StepPhase};

fn test_config(dir: &std::path::Path) -> Config {
    let mut config = Config::in_dir(dir);
    config.transport = Transport::Local;
    config
}

fn write_snapshot(config: &Config, jobs: Vec<Job>) {
    SnapshotWriter::new(&config.jobs_path).write(&Snapshot::new(jobs)).unwrap();
}

#[tokio::test]
async fn startup_binds_socket_and_writes_pid() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());

    let result = startup(&config).await.unwrap();
    assert!(config.socket_path.exists());
    let pid = std::fs::read_to_string(&config.lock_path).unwrap();
    assert_eq!(pid.trim(), std::process::id().to_string());
    assert!(result.tcp.is_none());
    assert!(result.daemon.broker.list().is_empty());

    result.daemon.shutdown();
    assert!(!config.socket_path.exists());
    assert!(!config.lock_path.exists());
}

#[tokio::test]
async fn startup_lock_failed_does_not_remove_existing_files() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    std::fs::write(&config.socket_path, b"").unwrap();

    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)
        .unwrap();
    lock_file.lock_exclusive().unwrap();
    std::fs::write(&config.lock_path, b"4242\n").unwrap();

    let err = startup(&config).await.err().unwrap();
    assert!(matches!(err, LifecycleError::LockFailed(_)), "{err}");
    assert!(config.socket_path.exists());
    assert_eq!(std::fs::read_to_string(&config.lock_path).unwrap(), "4242\n");

    drop(lock_file);
}

#[tokio::test]
async fn startup_with_bad_plans_file_cleans_up() {
    let dir = tempdir().unwrap();
    let mut config = test_config(dir.path());
    let plans = dir.path().join("plans.toml");
    std::fs::write(&plans, "[operation.\"x\"]\n").unwrap();
    config.plans_path = Some(plans);

    let err = startup(&config).await.err().unwrap();
    assert!(matches!(err, LifecycleError::Plan(_)), "{err}");
    assert!(!config.lock_path.exists());
    assert!(!config.socket_path.exists());
}

#[tokio::test]
async fn startup_fails_in_flight_jobs_from_snapshot() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());

    let running = Job::builder()
        .id("job-running")
        .operation("snapshot.create")
        .payload("host", "node1")
        .payload("volume", "vol1")
        .state(JobState::InProgress)
        .step("create snapshot", StepPhase::Forward, StepOutcome::Running)
        .build();
    let done = Job::builder().id("job-done").state(JobState::Completed).build();
    write_snapshot(&config, vec![running, done.clone()]);

    let result = startup(&config).await.unwrap();
    let broker = &result.daemon.broker;

    let job = broker.status(&JobId::from_string("job-running")).unwrap();
    assert_eq!(job.state, JobState::Failed);
    assert_eq!(
        job.error.as_deref(),
        Some("interrupted: daemon restarted during step create snapshot")
    );
    assert!(broker.leases().is_empty());
    assert_eq!(broker.status(&done.id).unwrap(), done);

    // Recovery outcome is persisted before any request is served
    let on_disk = crate::snapshot::load_snapshot(&config.jobs_path).unwrap().unwrap();
    let persisted = on_disk.jobs.iter().find(|j| j.id == "job-running").unwrap();
    assert_eq!(persisted.state, JobState::Failed);

    result.daemon.shutdown();
}
