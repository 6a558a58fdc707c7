// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation Broker: accept, status, and per-resource serialization

use crate::error::EngineError;
use crate::lease::ResourceLeases;
use crate::orchestrator::Orchestrator;
use crate::recovery::{recover_interrupted, RecoveryReport};
use crate::store::JobStore;
use crate::{EngineConfig, EngineDeps};
use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinHandle;
use vj_adapters::RemoteExecutor;
use vj_core::{Clock, Job, JobConfig, JobId, ResourceId};
use vj_plan::{validate_payload, PlanCatalog};

/// Accepted job: its ID plus the task driving it.
#[derive(Debug)]
pub struct JobHandle {
    id: JobId,
    task: JoinHandle<()>,
}

impl JobHandle {
    pub fn id(&self) -> &JobId {
        &self.id
    }

    /// Wait until the job's task has finished. Dropping the handle instead
    /// leaves the job running.
    pub async fn finished(self) -> JobId {
        let _ = self.task.await;
        self.id
    }
}

pub struct Broker<E, C> {
    catalog: Arc<PlanCatalog>,
    leases: ResourceLeases,
    orchestrator: Arc<Orchestrator<E, C>>,
}

impl<E, C> Clone for Broker<E, C> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            leases: self.leases.clone(),
            orchestrator: Arc::clone(&self.orchestrator),
        }
    }
}

impl<E: RemoteExecutor, C: Clock> Broker<E, C> {
    pub fn new(deps: EngineDeps<E, C>, catalog: PlanCatalog, config: EngineConfig) -> Self {
        Self {
            catalog: Arc::new(catalog),
            leases: ResourceLeases::new(),
            orchestrator: Arc::new(Orchestrator::new(deps, config)),
        }
    }

    pub fn store(&self) -> &JobStore {
        &self.orchestrator.deps().store
    }

    pub fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }

    pub fn leases(&self) -> &ResourceLeases {
        &self.leases
    }

    /// Validate, lease the target, store the job as pending and start it.
    ///
    /// Returns as soon as the job is stored; no remote I/O happens here.
    /// Must be called from within a tokio runtime.
    pub fn accept(
        &self,
        operation: &str,
        target: &str,
        payload: &Value,
    ) -> Result<JobHandle, EngineError> {
        let plan = self
            .catalog
            .get(operation)
            .ok_or_else(|| EngineError::Validation(format!("unknown operation {operation:?}")))?;
        let target = ResourceId::parse(target)
            .map_err(|e| EngineError::Validation(format!("invalid target: {e}")))?;
        let vars = validate_payload(plan, payload).map_err(|e| EngineError::Validation(e.to_string()))?;

        let id = JobId::generate();
        let lease = self.leases.try_acquire(&target, &id).map_err(|c| {
            tracing::info!(resource = %c.target, holder = %c.holder, operation, "accept rejected: resource busy");
            EngineError::Conflict { target: c.target, holder: c.holder }
        })?;

        let config = JobConfig::new(operation, target).id(id.clone()).payload(vars);
        let job = Job::new(config, &self.orchestrator.deps().clock);
        self.store().insert(job).map_err(|e| EngineError::Internal(e.to_string()))?;
        tracing::info!(job_id = %id, operation, resource = %lease.target(), "job accepted");

        let orchestrator = Arc::clone(&self.orchestrator);
        let plan = Arc::new(plan.clone());
        let job_id = id.clone();
        let task = tokio::spawn(async move {
            let run = tokio::spawn({
                let orchestrator = Arc::clone(&orchestrator);
                let job_id = job_id.clone();
                async move { orchestrator.run(job_id, plan, lease).await }
            });
            let failure = match run.await {
                Ok(Ok(_)) => return,
                Ok(Err(e)) => format!("internal error: {e}"),
                Err(e) => format!("internal error: job task ended abnormally: {e}"),
            };
            tracing::error!(job_id = %job_id, error = %failure, "job run aborted");
            if let Err(e) = orchestrator.abandon(&job_id, &failure) {
                tracing::error!(job_id = %job_id, error = %e, "could not record job failure");
            }
        });

        Ok(JobHandle { id, task })
    }

    /// Point-in-time snapshot of a job.
    pub fn status(&self, id: &JobId) -> Result<Job, EngineError> {
        self.store().get(id).ok_or_else(|| EngineError::NotFound(id.clone()))
    }

    pub fn list(&self) -> Vec<Job> {
        self.store().list()
    }

    /// Fail every non-terminal job left by a previous run, replaying its hooks.
    pub async fn recover(&self) -> RecoveryReport {
        recover_interrupted(&self.orchestrator, &self.catalog).await
    }

    /// Prune terminal jobs older than the retention window.
    pub fn prune(&self) -> usize {
        let config = self.orchestrator.config();
        let now = self.orchestrator.deps().clock.epoch_ms();
        let cutoff = now.saturating_sub(config.retention.as_millis() as u64);
        self.store().prune_terminal(cutoff)
    }
}

#[cfg(test)]
#[path = "broker_tests.rs"]
mod tests;
