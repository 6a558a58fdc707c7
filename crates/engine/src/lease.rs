// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-resource leases
//!
//! A [`Lease`] is the only way to hold a target resource. It is acquired
//! without blocking and released when dropped, so every exit path of the
//! owning job gives the resource back.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use vj_core::{JobId, ResourceId};

/// The resource is held by another job.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{target} is held by {holder}")]
pub struct LeaseConflict {
    pub target: ResourceId,
    pub holder: JobId,
}

/// Table of held resources
#[derive(Clone, Default)]
pub struct ResourceLeases {
    held: Arc<Mutex<HashMap<ResourceId, JobId>>>,
}

impl ResourceLeases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take `target` for `job`, or report who holds it.
    pub fn try_acquire(&self, target: &ResourceId, job: &JobId) -> Result<Lease, LeaseConflict> {
        let mut held = self.held.lock();
        if let Some(holder) = held.get(target) {
            return Err(LeaseConflict { target: target.clone(), holder: holder.clone() });
        }
        held.insert(target.clone(), job.clone());
        tracing::debug!(resource = %target, job_id = %job, "lease acquired");
        Ok(Lease { leases: self.clone(), target: target.clone(), job: job.clone() })
    }

    pub fn holder(&self, target: &ResourceId) -> Option<JobId> {
        self.held.lock().get(target).cloned()
    }

    pub fn len(&self) -> usize {
        self.held.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.lock().is_empty()
    }
}

/// Exclusive hold on one resource for one job.
pub struct Lease {
    leases: ResourceLeases,
    target: ResourceId,
    job: JobId,
}

impl Lease {
    pub fn target(&self) -> &ResourceId {
        &self.target
    }

    pub fn job(&self) -> &JobId {
        &self.job
    }
}

impl std::fmt::Debug for Lease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lease").field("target", &self.target).field("job", &self.job).finish()
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        let mut held = self.leases.held.lock();
        if held.get(&self.target) == Some(&self.job) {
            held.remove(&self.target);
            tracing::debug!(resource = %self.target, job_id = %self.job, "lease released");
        }
    }
}

#[cfg(test)]
#[path = "lease_tests.rs"]
mod tests;
