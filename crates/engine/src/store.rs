// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job Store: one writer per job, any number of readers
//!
//! Readers always get a cloned snapshot taken under the read lock, so a
//! committed terminal state is visible to every read that follows it.
//!
//! Commits only mark the store dirty. A dedicated flush thread hands the
//! newest job set to the [`FlushHook`], folding any commits that landed
//! while it was busy into a single flush.

use parking_lot::{Condvar, Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use vj_core::{Job, JobId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("job {0} already exists")]
    Duplicate(JobId),
    #[error("job {0} not found")]
    NotFound(JobId),
    #[error("job {0} already has a writer")]
    WriterHeld(JobId),
}

/// Receives the full job set from the flush thread after commits.
pub trait FlushHook: Send + Sync + 'static {
    fn flush(&self, jobs: &[Job]) -> std::io::Result<()>;
}

#[derive(Default)]
struct StoreInner {
    jobs: HashMap<JobId, Job>,
    writers: HashSet<JobId>,
}

impl StoreInner {
    fn sorted(&self) -> Vec<Job> {
        let mut jobs: Vec<Job> = self.jobs.values().cloned().collect();
        jobs.sort_by(|a, b| a.created_at_ms.cmp(&b.created_at_ms).then_with(|| a.id.cmp(&b.id)));
        jobs
    }
}

#[derive(Default)]
struct FlushState {
    /// Bumped on every commit
    requested: u64,
    /// Highest `requested` value the hook has seen
    flushed: u64,
    closed: bool,
}

struct Flusher {
    state: Mutex<FlushState>,
    changed: Condvar,
}

impl Flusher {
    fn mark_dirty(&self) {
        self.state.lock().requested += 1;
        self.changed.notify_all();
    }

    /// Block until every commit made before the call has been flushed.
    fn sync(&self) {
        let mut state = self.state.lock();
        let target = state.requested;
        while state.flushed < target {
            self.changed.wait(&mut state);
        }
    }

    fn close(&self) {
        self.state.lock().closed = true;
        self.changed.notify_all();
    }

    fn run(&self, inner: &RwLock<StoreInner>, hook: &dyn FlushHook) {
        loop {
            let target = {
                let mut state = self.state.lock();
                while state.requested == state.flushed && !state.closed {
                    self.changed.wait(&mut state);
                }
                if state.requested == state.flushed {
                    return;
                }
                state.requested
            };

            let jobs = inner.read().sorted();
            if let Err(e) = hook.flush(&jobs) {
                tracing::error!(error = %e, "job store flush failed");
            }

            self.state.lock().flushed = target;
            self.changed.notify_all();
        }
    }
}

/// Stops the flush thread once the last store handle is gone.
struct FlushHandle(Arc<Flusher>);

impl Drop for FlushHandle {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// Shared job table. `JobStore::default()` keeps jobs in memory only.
#[derive(Clone, Default)]
pub struct JobStore {
    inner: Arc<RwLock<StoreInner>>,
    /// Absent for a purely in-memory store
    flusher: Option<Arc<FlushHandle>>,
}

impl JobStore {
    /// Store that persists through `hook` on its own thread.
    pub fn new(hook: impl FlushHook) -> std::io::Result<Self> {
        let inner = Arc::new(RwLock::new(StoreInner::default()));
        let flusher =
            Arc::new(Flusher { state: Mutex::new(FlushState::default()), changed: Condvar::new() });

        let thread_inner = Arc::clone(&inner);
        let thread_flusher = Arc::clone(&flusher);
        std::thread::Builder::new()
            .name("vj-flush".to_string())
            .spawn(move || thread_flusher.run(&thread_inner, &hook))?;

        Ok(Self { inner, flusher: Some(Arc::new(FlushHandle(flusher))) })
    }

    /// Load previously persisted jobs without flushing.
    pub fn restore(&self, jobs: impl IntoIterator<Item = Job>) {
        let mut inner = self.inner.write();
        for job in jobs {
            inner.jobs.insert(job.id.clone(), job);
        }
    }

    pub fn insert(&self, job: Job) -> Result<(), StoreError> {
        {
            let mut inner = self.inner.write();
            if inner.jobs.contains_key(&job.id) {
                return Err(StoreError::Duplicate(job.id));
            }
            inner.jobs.insert(job.id.clone(), job);
        }
        self.flush();
        Ok(())
    }

    /// Point-in-time copy of one job
    pub fn get(&self, id: &JobId) -> Option<Job> {
        self.inner.read().jobs.get(id).cloned()
    }

    /// All jobs, oldest first
    pub fn list(&self) -> Vec<Job> {
        self.inner.read().sorted()
    }

    pub fn len(&self) -> usize {
        self.inner.read().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().jobs.is_empty()
    }

    /// Claim exclusive write access to `id` until the writer is dropped.
    pub fn writer(&self, id: &JobId) -> Result<JobWriter, StoreError> {
        let mut inner = self.inner.write();
        if !inner.jobs.contains_key(id) {
            return Err(StoreError::NotFound(id.clone()));
        }
        if !inner.writers.insert(id.clone()) {
            return Err(StoreError::WriterHeld(id.clone()));
        }
        Ok(JobWriter { store: self.clone(), id: id.clone() })
    }

    /// Drop terminal jobs that finished before `cutoff_ms`.
    pub fn prune_terminal(&self, cutoff_ms: u64) -> usize {
        let pruned = {
            let mut inner = self.inner.write();
            let before = inner.jobs.len();
            inner.jobs.retain(|_, job| {
                !(job.is_terminal() && job.completed_at_ms.is_some_and(|at| at < cutoff_ms))
            });
            before - inner.jobs.len()
        };
        if pruned > 0 {
            tracing::info!(pruned, "pruned terminal jobs");
            self.flush();
        }
        pruned
    }

    /// Wait until every commit made so far has been handed to the hook.
    pub fn sync(&self) {
        if let Some(handle) = &self.flusher {
            handle.0.sync();
        }
    }

    fn flush(&self) {
        if let Some(handle) = &self.flusher {
            handle.0.mark_dirty();
        }
    }
}

/// Exclusive mutation handle for one job.
pub struct JobWriter {
    store: JobStore,
    id: JobId,
}

impl JobWriter {
    pub fn id(&self) -> &JobId {
        &self.id
    }

    /// Current committed state of the job
    pub fn read(&self) -> Option<Job> {
        self.store.get(&self.id)
    }

    /// Apply `f` to the stored job and commit atomically.
    pub fn update<R>(&self, f: impl FnOnce(&mut Job) -> R) -> Result<R, StoreError> {
        let out = {
            let mut inner = self.store.inner.write();
            let job = inner.jobs.get_mut(&self.id).ok_or_else(|| StoreError::NotFound(self.id.clone()))?;
            f(job)
        };
        self.store.flush();
        Ok(out)
    }
}

impl Drop for JobWriter {
    fn drop(&mut self) {
        self.store.inner.write().writers.remove(&self.id);
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
