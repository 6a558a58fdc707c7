// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step Orchestrator
//!
//! Runs one job's forward steps strictly in order. Each completed step
//! may register a compensation (pushed on a stack) and a finalizer
//! (appended to a list). When the chain ends, one unwind routine runs the
//! compensations LIFO if a step failed, then every finalizer LIFO. The
//! first step failure is the job's error; hook failures are only logged.

use crate::error::StepError;
use crate::lease::Lease;
use crate::parser::decode;
use crate::store::{JobWriter, StoreError};
use crate::{EngineConfig, EngineDeps};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use vj_adapters::RemoteExecutor;
use vj_core::{Clock, Job, JobId, JobState, StepOutcome, StepPhase};
use vj_plan::{OperationPlan, ResolvedAction, ResolvedStep};

/// Hooks registered by completed forward steps
#[derive(Debug, Default)]
pub(crate) struct Unwind {
    compensations: Vec<ResolvedAction>,
    finalizers: Vec<ResolvedAction>,
}

impl Unwind {
    fn register(&mut self, step: &ResolvedStep) {
        if let Some(c) = &step.compensation {
            self.compensations.push(c.clone());
        }
        if let Some(f) = &step.finalizer {
            self.finalizers.push(f.clone());
        }
    }

    /// Rebuild the hooks a job had registered before an interruption,
    /// skipping any that already completed.
    pub(crate) fn replay(job: &Job, steps: &[ResolvedStep]) -> Self {
        let completed: HashSet<&str> = job.completed_forward_steps().collect();
        let done: HashSet<(&str, StepPhase)> = job
            .steps
            .iter()
            .filter(|r| r.phase != StepPhase::Forward && r.outcome == StepOutcome::Completed)
            .map(|r| (r.name.as_str(), r.phase))
            .collect();

        let mut unwind = Unwind::default();
        for step in steps.iter().filter(|s| completed.contains(s.name.as_str())) {
            if let Some(c) = &step.compensation {
                if !done.contains(&(c.label.as_str(), StepPhase::Compensation)) {
                    unwind.compensations.push(c.clone());
                }
            }
            if let Some(f) = &step.finalizer {
                if !done.contains(&(f.label.as_str(), StepPhase::Finalizer)) {
                    unwind.finalizers.push(f.clone());
                }
            }
        }
        unwind
    }
}

pub struct Orchestrator<E, C> {
    deps: EngineDeps<E, C>,
    config: EngineConfig,
}

impl<E: RemoteExecutor, C: Clock> Orchestrator<E, C> {
    pub fn new(deps: EngineDeps<E, C>, config: EngineConfig) -> Self {
        Self { deps, config }
    }

    pub fn deps(&self) -> &EngineDeps<E, C> {
        &self.deps
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Drive a pending job to a terminal state.
    ///
    /// `lease` is dropped only after the terminal state is committed.
    pub async fn run(
        &self,
        job_id: JobId,
        plan: Arc<OperationPlan>,
        lease: Lease,
    ) -> Result<JobState, StoreError> {
        let writer = self.deps.store.writer(&job_id)?;
        let now = self.deps.clock.epoch_ms();
        if let Err(e) = writer.update(|j| j.begin(now))? {
            tracing::error!(job_id = %job_id, error = %e, "job cannot start");
            return Ok(e.from);
        }
        let job = writer.read().ok_or_else(|| StoreError::NotFound(job_id.clone()))?;
        tracing::info!(
            job_id = %job_id,
            operation = %job.operation,
            resource = %job.target,
            "job started"
        );

        let mut unwind = Unwind::default();
        let outcome = match plan.resolve(&job, self.config.default_timeout_secs) {
            Ok(steps) => self.forward(&writer, &steps, &mut unwind).await?,
            Err(e) => Err(e.to_string()),
        };

        self.unwind(&writer, unwind, outcome.is_err()).await?;
        let state = self.finish(&writer, outcome)?;
        drop(lease);
        Ok(state)
    }

    async fn forward(
        &self,
        writer: &JobWriter,
        steps: &[ResolvedStep],
        unwind: &mut Unwind,
    ) -> Result<Result<Value, String>, StoreError> {
        let mut result = json!({});
        for step in steps {
            match self.perform(writer, &step.forward, StepPhase::Forward).await? {
                Ok(payload) => {
                    unwind.register(step);
                    result = payload.unwrap_or_else(|| json!({}));
                }
                Err(e) => return Ok(Err(format!("{}: {e}", step.name))),
            }
        }
        Ok(Ok(result))
    }

    /// Run compensations (only when `failed`) then finalizers, both LIFO.
    pub(crate) async fn unwind(
        &self,
        writer: &JobWriter,
        unwind: Unwind,
        failed: bool,
    ) -> Result<(), StoreError> {
        if failed {
            for action in unwind.compensations.iter().rev() {
                self.perform(writer, action, StepPhase::Compensation).await?;
            }
        }
        for action in unwind.finalizers.iter().rev() {
            self.perform(writer, action, StepPhase::Finalizer).await?;
        }
        Ok(())
    }

    fn finish(
        &self,
        writer: &JobWriter,
        outcome: Result<Value, String>,
    ) -> Result<JobState, StoreError> {
        let now = self.deps.clock.epoch_ms();
        let committed = writer.update(|j| match outcome {
            Ok(result) => j.complete(result, now).map(|_| j.state),
            Err(error) => j.fail(error, now).map(|_| j.state),
        })?;
        match committed {
            Ok(JobState::Completed) => {
                tracing::info!(job_id = %writer.id(), "job completed");
                Ok(JobState::Completed)
            }
            Ok(state) => {
                let error = writer.read().and_then(|j| j.error).unwrap_or_default();
                tracing::warn!(job_id = %writer.id(), %error, "job failed");
                Ok(state)
            }
            Err(e) => {
                tracing::error!(job_id = %writer.id(), error = %e, "terminal transition rejected");
                Ok(e.from)
            }
        }
    }

    /// Execute one action, recording it in the job's step history.
    async fn perform(
        &self,
        writer: &JobWriter,
        action: &ResolvedAction,
        phase: StepPhase,
    ) -> Result<Result<Option<Value>, StepError>, StoreError> {
        let started = self.deps.clock.epoch_ms();
        writer.update(|j| j.push_step(&action.label, phase, started))?;
        let timer = tokio::time::Instant::now();

        let result = self.attempt(writer.id(), action).await;

        let elapsed_ms = timer.elapsed().as_millis() as u64;
        let outcome = match &result {
            Ok(_) => StepOutcome::Completed,
            Err(e) => StepOutcome::Failed(e.to_string()),
        };
        let finished = self.deps.clock.epoch_ms();
        writer.update(|j| j.finish_step(outcome, finished))?;

        match (&result, phase) {
            (Ok(_), _) => tracing::info!(
                job_id = %writer.id(),
                step = %action.label,
                %phase,
                host = %action.command.host,
                elapsed_ms,
                "step completed"
            ),
            (Err(e), StepPhase::Forward) => tracing::warn!(
                job_id = %writer.id(),
                step = %action.label,
                host = %action.command.host,
                elapsed_ms,
                error = %e,
                "step failed"
            ),
            (Err(e), _) => tracing::warn!(
                job_id = %writer.id(),
                step = %action.label,
                %phase,
                host = %action.command.host,
                error = %e,
                "cleanup action failed; continuing"
            ),
        }
        Ok(result)
    }

    async fn attempt(&self, job_id: &JobId, action: &ResolvedAction) -> Result<Option<Value>, StepError> {
        let mut retries_left = self.config.timeout_retries;
        loop {
            let raw = match self.deps.executor.execute(&action.command).await {
                Ok(raw) => raw,
                Err(e) => {
                    let err = StepError::from(e);
                    if err.is_timeout() && retries_left > 0 {
                        retries_left -= 1;
                        tracing::warn!(job_id = %job_id, step = %action.label, retries_left, "timed out; retrying");
                        continue;
                    }
                    if let StepError::Transport(msg) = &err {
                        tracing::error!(job_id = %job_id, host = %action.command.host, error = %msg, "transport error");
                    }
                    return Err(err);
                }
            };
            let result = decode(&raw, &action.expect)?;
            if !result.is_success() {
                return Err(StepError::application(result.return_code, result.errno, &result.error_text));
            }
            return Ok(result.payload);
        }
    }

    /// Fail a job whose run ended without reaching a terminal state.
    pub(crate) fn abandon(&self, job_id: &JobId, reason: &str) -> Result<(), StoreError> {
        let writer = self.deps.store.writer(job_id)?;
        let now = self.deps.clock.epoch_ms();
        writer.update(|j| {
            if j.is_terminal() {
                return;
            }
            if j.state == JobState::Pending {
                let _ = j.begin(now);
            }
            j.finish_step(StepOutcome::Failed(reason.to_string()), now);
            let _ = j.fail(reason, now);
        })
    }

    /// Finish a job that was in flight when the daemon stopped.
    ///
    /// Hooks of the forward steps that had completed are replayed through
    /// the same unwind routine; the job then fails.
    pub(crate) async fn resume_interrupted(
        &self,
        job_id: &JobId,
        plan: Option<&OperationPlan>,
    ) -> Result<JobState, StoreError> {
        let writer = self.deps.store.writer(job_id)?;
        let job = writer.read().ok_or_else(|| StoreError::NotFound(job_id.clone()))?;

        let primary = job.steps.iter().find_map(|r| match (&r.phase, &r.outcome) {
            (StepPhase::Forward, StepOutcome::Failed(e)) => Some(format!("{}: {e}", r.name)),
            _ => None,
        });
        let reason = primary.unwrap_or_else(|| match job.running_step() {
            Some(r) => format!("interrupted: daemon restarted during step {}", r.name),
            None if job.state == JobState::Pending => {
                "interrupted: daemon restarted before the job started".to_string()
            }
            None => "interrupted: daemon restarted between steps".to_string(),
        });

        let now = self.deps.clock.epoch_ms();
        writer.update(|j| {
            j.finish_step(StepOutcome::Failed("interrupted".to_string()), now);
            if j.state == JobState::Pending {
                let _ = j.begin(now);
            }
        })?;

        let unwind = match plan {
            Some(plan) => match plan.resolve(&job, self.config.default_timeout_secs) {
                Ok(steps) => Unwind::replay(&job, &steps),
                Err(e) => {
                    tracing::warn!(job_id = %job_id, error = %e, "cannot replay hooks");
                    Unwind::default()
                }
            },
            None => {
                tracing::warn!(job_id = %job_id, operation = %job.operation, "plan no longer defined; no hooks replayed");
                Unwind::default()
            }
        };

        // the job ends failed, so anything its forward steps did is undone
        tracing::info!(job_id = %job_id, %reason, "recovering interrupted job");
        self.unwind(&writer, unwind, true).await?;
        self.finish(&writer, Err(reason))
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
