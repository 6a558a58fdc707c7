// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;
use vj_core::{JobState, StepOutcome, StepPhase};
use vj_engine::JobStore;

fn sample_jobs() -> Vec<Job> {
    vec![
        Job::builder().id("job-a").state(JobState::Completed).build(),
        Job::builder()
            .id("job-b")
            .state(JobState::InProgress)
            .step("activate snapshot", StepPhase::Forward, StepOutcome::Completed)
            .step("clone volume", StepPhase::Forward, StepOutcome::Running)
            .build(),
    ]
}

#[test]
fn missing_file_loads_as_none() {
    let dir = tempdir().unwrap();
    assert!(load_snapshot(&dir.path().join("jobs.json")).unwrap().is_none());
}

#[test]
fn written_snapshot_loads_back() {
    let dir = tempdir().unwrap();
    let writer = SnapshotWriter::new(dir.path().join("jobs.json"));
    writer.flush(&sample_jobs()).unwrap();

    let loaded = load_snapshot(writer.path()).unwrap().unwrap();
    assert_eq!(loaded.version, CURRENT_SNAPSHOT_VERSION);
    assert_eq!(loaded.jobs, sample_jobs());
    assert!(!dir.path().join("jobs.json.tmp").exists());
}

#[test]
fn corrupt_snapshot_is_moved_aside() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("jobs.json");
    std::fs::write(&path, b"{not json").unwrap();

    assert!(load_snapshot(&path).unwrap().is_none());
    assert!(!path.exists());
    assert_eq!(std::fs::read(dir.path().join("jobs.bak")).unwrap(), b"{not json");
}

#[test]
fn unknown_version_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("jobs.json");
    let mut snapshot = serde_json::to_value(Snapshot::new(Vec::new())).unwrap();
    snapshot["v"] = serde_json::json!(99);
    std::fs::write(&path, serde_json::to_vec(&snapshot).unwrap()).unwrap();

    assert!(matches!(load_snapshot(&path), Err(SnapshotError::Version(99))));
    assert!(path.exists());
}

#[test]
fn bak_rotation_keeps_three() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("jobs.json");
    for round in 0..4 {
        std::fs::write(&path, format!("garbage {round}")).unwrap();
        load_snapshot(&path).unwrap();
    }

    assert_eq!(std::fs::read_to_string(dir.path().join("jobs.bak")).unwrap(), "garbage 3");
    assert_eq!(std::fs::read_to_string(dir.path().join("jobs.bak.2")).unwrap(), "garbage 2");
    assert_eq!(std::fs::read_to_string(dir.path().join("jobs.bak.3")).unwrap(), "garbage 1");
    assert!(!dir.path().join("jobs.bak.4").exists());
}

#[test]
fn store_commits_reach_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("jobs.json");
    let store = JobStore::new(SnapshotWriter::new(&path)).unwrap();

    store.insert(Job::builder().id("job-x").build()).unwrap();
    store.sync();
    let on_disk = load_snapshot(&path).unwrap().unwrap();
    assert_eq!(on_disk.jobs.len(), 1);
    assert_eq!(on_disk.jobs[0].id, "job-x");

    let writer = store.writer(&on_disk.jobs[0].id).unwrap();
    writer.update(|job| job.begin(2_000_000)).unwrap().unwrap();
    store.sync();
    let on_disk = load_snapshot(&path).unwrap().unwrap();
    assert_eq!(on_disk.jobs[0].state, JobState::InProgress);
}
