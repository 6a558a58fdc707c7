// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup recovery of jobs interrupted by a restart

use crate::orchestrator::Orchestrator;
use vj_adapters::RemoteExecutor;
use vj_core::{Clock, JobId};
use vj_plan::PlanCatalog;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Jobs moved to Failed
    pub recovered: Vec<JobId>,
    /// Jobs that could not be updated
    pub errors: Vec<(JobId, String)>,
}

/// Resolve every non-terminal job in the store.
///
/// Runs before any new work is accepted, so no leases exist yet.
pub async fn recover_interrupted<E: RemoteExecutor, C: Clock>(
    orchestrator: &Orchestrator<E, C>,
    catalog: &PlanCatalog,
) -> RecoveryReport {
    let mut report = RecoveryReport::default();
    let pending: Vec<_> =
        orchestrator.deps().store.list().into_iter().filter(|j| !j.is_terminal()).collect();
    for job in pending {
        let plan = catalog.get(&job.operation);
        match orchestrator.resume_interrupted(&job.id, plan).await {
            Ok(_) => report.recovered.push(job.id),
            Err(e) => {
                tracing::error!(job_id = %job.id, error = %e, "failed to recover job");
                report.errors.push((job.id, e.to_string()));
            }
        }
    }
    if !report.recovered.is_empty() {
        tracing::info!(count = report.recovered.len(), "recovered interrupted jobs");
    }
    report
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;
