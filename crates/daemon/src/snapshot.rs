// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot persistence for crash recovery.
//!
//! The job store hands every committed job set to [`SnapshotWriter`], which
//! replaces `jobs.json` atomically. Startup loads the last snapshot and
//! recovers whatever was still in flight.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;
use vj_core::Job;
use vj_engine::FlushHook;

/// Current snapshot schema version
pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported snapshot version {0}")]
    Version(u32),
}

/// All retained jobs at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Schema version for migrations
    #[serde(rename = "v")]
    pub version: u32,
    pub jobs: Vec<Job>,
    /// When this snapshot was written
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(jobs: Vec<Job>) -> Self {
        Self { version: CURRENT_SNAPSHOT_VERSION, jobs, created_at: Utc::now() }
    }
}

/// Load the snapshot at `path`.
///
/// A missing file yields `None`. A file that cannot be parsed is moved
/// aside to a `.bak` path and also yields `None`, so one bad write does
/// not keep the daemon from starting.
pub fn load_snapshot(path: &Path) -> Result<Option<Snapshot>, SnapshotError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    match serde_json::from_slice::<Snapshot>(&bytes) {
        Ok(snapshot) if snapshot.version == CURRENT_SNAPSHOT_VERSION => Ok(Some(snapshot)),
        Ok(snapshot) => Err(SnapshotError::Version(snapshot.version)),
        Err(e) => {
            let bak = rotate_bak_path(path);
            warn!(error = %e, backup = %bak.display(), "corrupt snapshot, moving aside");
            fs::rename(path, &bak)?;
            Ok(None)
        }
    }
}

/// Flush hook that persists the job set as a JSON snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    path: PathBuf,
}

impl SnapshotWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write to a sibling temp file, sync, then rename over the target.
    pub fn write(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let tmp = self.path.with_extension("json.tmp");
        let bytes = serde_json::to_vec(snapshot)?;
        {
            let mut file = File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl FlushHook for SnapshotWriter {
    fn flush(&self, jobs: &[Job]) -> std::io::Result<()> {
        self.write(&Snapshot::new(jobs.to_vec())).map_err(|e| match e {
            SnapshotError::Io(e) => e,
            other => std::io::Error::other(other),
        })
    }
}

const MAX_BAK_FILES: u32 = 3;

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
///
/// Keeps up to [`MAX_BAK_FILES`] backups: `.bak`, `.bak.2`, `.bak.3`.
pub(crate) fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }
    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }

    bak(1)
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
