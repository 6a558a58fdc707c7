// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job record and its forward-only state machine.

use crate::clock::Clock;
use crate::resource::ResourceId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

crate::define_id! {
    /// Unique identifier for an accepted operation.
    ///
    /// Returned to the caller at accept time and used for every
    /// subsequent status query.
    pub struct JobId("job-");
}

/// Lifecycle state of a job.
///
/// Transitions only move forward: `Pending → InProgress → {Completed, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(self, next: JobState) -> bool {
        matches!(
            (self, next),
            (JobState::Pending, JobState::InProgress)
                | (JobState::InProgress, JobState::Completed)
                | (JobState::InProgress, JobState::Failed)
        )
    }
}

crate::simple_display! {
    JobState {
        Pending => "pending",
        InProgress => "in_progress",
        Completed => "completed",
        Failed => "failed",
    }
}

/// Rejected state change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid job transition {from} -> {to}")]
pub struct TransitionError {
    pub from: JobState,
    pub to: JobState,
}

/// Which hook list a step record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPhase {
    Forward,
    Compensation,
    Finalizer,
}

crate::simple_display! {
    StepPhase {
        Forward => "forward",
        Compensation => "compensation",
        Finalizer => "finalizer",
    }
}

/// Outcome of one executed action (for step history)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum StepOutcome {
    Running,
    Completed,
    Failed(String),
}

/// Record of an executed action (for step history)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub name: String,
    pub phase: StepPhase,
    pub started_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at_ms: Option<u64>,
    pub outcome: StepOutcome,
}

/// Parameters for a new job
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub id: JobId,
    pub operation: String,
    pub target: ResourceId,
    pub payload: BTreeMap<String, String>,
}

impl JobConfig {
    pub fn new(operation: impl Into<String>, target: ResourceId) -> Self {
        Self { id: JobId::generate(), operation: operation.into(), target, payload: BTreeMap::new() }
    }

    crate::setters! {
        set {
            id: JobId,
            payload: BTreeMap<String, String>,
        }
    }
}

/// Runtime record tracking one accepted operation end to end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    /// Operation type (plan name, e.g. `snapshot.clone`)
    pub operation: String,
    pub state: JobState,
    pub target: ResourceId,
    /// Validated request payload, used for command interpolation
    #[serde(default)]
    pub payload: BTreeMap<String, String>,
    pub created_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at_ms: Option<u64>,
    /// Set iff `state == Completed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Set iff `state == Failed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub steps: Vec<StepRecord>,
}

impl Job {
    pub fn new(config: JobConfig, clock: &impl Clock) -> Self {
        Self::new_with_epoch_ms(config, clock.epoch_ms())
    }

    pub fn new_with_epoch_ms(config: JobConfig, epoch_ms: u64) -> Self {
        Self {
            id: config.id,
            operation: config.operation,
            state: JobState::Pending,
            target: config.target,
            payload: config.payload,
            created_at_ms: epoch_ms,
            started_at_ms: None,
            completed_at_ms: None,
            result: None,
            error: None,
            steps: Vec::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    fn advance(&mut self, next: JobState) -> Result<(), TransitionError> {
        if !self.state.can_advance_to(next) {
            return Err(TransitionError { from: self.state, to: next });
        }
        self.state = next;
        Ok(())
    }

    /// Pending → InProgress
    pub fn begin(&mut self, epoch_ms: u64) -> Result<(), TransitionError> {
        self.advance(JobState::InProgress)?;
        self.started_at_ms = Some(epoch_ms);
        Ok(())
    }

    /// InProgress → Completed, recording the result payload
    pub fn complete(&mut self, result: Value, epoch_ms: u64) -> Result<(), TransitionError> {
        self.advance(JobState::Completed)?;
        self.result = Some(result);
        self.completed_at_ms = Some(epoch_ms);
        Ok(())
    }

    /// InProgress → Failed, recording the primary error
    pub fn fail(&mut self, error: impl Into<String>, epoch_ms: u64) -> Result<(), TransitionError> {
        self.advance(JobState::Failed)?;
        self.error = Some(error.into());
        self.completed_at_ms = Some(epoch_ms);
        Ok(())
    }

    /// Start a new step record
    pub fn push_step(&mut self, name: &str, phase: StepPhase, epoch_ms: u64) {
        self.steps.push(StepRecord {
            name: name.to_string(),
            phase,
            started_at_ms: epoch_ms,
            finished_at_ms: None,
            outcome: StepOutcome::Running,
        });
    }

    /// Finalize the most recent step record if it is still running
    pub fn finish_step(&mut self, outcome: StepOutcome, epoch_ms: u64) {
        if let Some(record) = self.steps.last_mut() {
            if record.finished_at_ms.is_none() {
                record.finished_at_ms = Some(epoch_ms);
                record.outcome = outcome;
            }
        }
    }

    /// The step currently executing, if any
    pub fn running_step(&self) -> Option<&StepRecord> {
        self.steps.last().filter(|r| r.finished_at_ms.is_none())
    }

    /// Names of forward steps that completed, in completion order
    pub fn completed_forward_steps(&self) -> impl Iterator<Item = &str> {
        self.steps
            .iter()
            .filter(|r| r.phase == StepPhase::Forward && r.outcome == StepOutcome::Completed)
            .map(|r| r.name.as_str())
    }
}

/// Test builder for [`Job`]
#[cfg(any(test, feature = "test-support"))]
pub struct JobBuilder {
    job: Job,
}

#[cfg(any(test, feature = "test-support"))]
impl Default for JobBuilder {
    fn default() -> Self {
        let config = JobConfig::new("snapshot.clone", crate::test_support::rid("snap1")).id(JobId::from_string("job-test"));
        Self { job: Job::new_with_epoch_ms(config, 1_000_000) }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl JobBuilder {
    pub fn id(mut self, id: &str) -> Self {
        self.job.id = JobId::from_string(id);
        self
    }

    pub fn operation(mut self, op: &str) -> Self {
        self.job.operation = op.to_string();
        self
    }

    pub fn target(mut self, target: ResourceId) -> Self {
        self.job.target = target;
        self
    }

    pub fn state(mut self, state: JobState) -> Self {
        self.job.state = state;
        self
    }

    pub fn payload(mut self, key: &str, value: &str) -> Self {
        self.job.payload.insert(key.to_string(), value.to_string());
        self
    }

    pub fn step(mut self, name: &str, phase: StepPhase, outcome: StepOutcome) -> Self {
        let at = self.job.created_at_ms;
        self.job.push_step(name, phase, at);
        if outcome != StepOutcome::Running {
            self.job.finish_step(outcome, at);
        }
        self
    }

    pub fn build(self) -> Job {
        self.job
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Job {
    /// Create a builder with test defaults.
    pub fn builder() -> JobBuilder {
        JobBuilder::default()
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
