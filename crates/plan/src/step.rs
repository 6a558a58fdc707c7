// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step descriptors and their resolution into remote commands

use crate::schema::ResultSchema;
use crate::template::{interpolate, UnboundVar};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vj_core::RemoteCommand;

fn default_host() -> String {
    "${host}".to_string()
}

/// One remote action: a host template, a command template, and the
/// payload shape its output must satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionDef {
    /// Display label (compensations and finalizers; forward actions use the step name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "default_host")]
    pub host: String,
    pub command: String,
    /// Per-action timeout override in seconds
    #[serde(default, rename = "timeout", skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "ResultSchema::is_unconstrained")]
    pub expect: ResultSchema,
}

impl ActionDef {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            name: None,
            host: default_host(),
            command: command.into(),
            timeout_secs: None,
            expect: ResultSchema::default(),
        }
    }

    /// Both templates carried by this action
    pub fn templates(&self) -> [&str; 2] {
        [&self.host, &self.command]
    }

    pub fn resolve(
        &self,
        label: &str,
        vars: &BTreeMap<String, String>,
        default_timeout_secs: u64,
    ) -> Result<ResolvedAction, UnboundVar> {
        Ok(ResolvedAction {
            label: label.to_string(),
            command: RemoteCommand {
                host: interpolate(&self.host, vars)?,
                command: interpolate(&self.command, vars)?,
                timeout_secs: self.timeout_secs.unwrap_or(default_timeout_secs),
            },
            expect: self.expect.clone(),
        })
    }
}

/// One forward step of an operation plan with its optional hooks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepDef {
    pub name: String,
    /// Forward action
    pub run: ActionDef,
    /// Runs only if a later step of the same job fails
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compensate: Option<ActionDef>,
    /// Runs once the job reaches any terminal state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finalize: Option<ActionDef>,
}

impl StepDef {
    pub fn compensation_label(&self) -> String {
        label_or(self.compensate.as_ref(), || format!("undo {}", self.name))
    }

    pub fn finalizer_label(&self) -> String {
        label_or(self.finalize.as_ref(), || format!("finalize {}", self.name))
    }

    /// Every action in this step, forward first
    pub fn actions(&self) -> impl Iterator<Item = &ActionDef> {
        std::iter::once(&self.run).chain(self.compensate.iter()).chain(self.finalize.iter())
    }

    /// Interpolate all templates against the job's variables.
    pub fn resolve(
        &self,
        vars: &BTreeMap<String, String>,
        default_timeout_secs: u64,
    ) -> Result<ResolvedStep, UnboundVar> {
        let compensation = match &self.compensate {
            Some(action) => {
                Some(action.resolve(&self.compensation_label(), vars, default_timeout_secs)?)
            }
            None => None,
        };
        let finalizer = match &self.finalize {
            Some(action) => Some(action.resolve(&self.finalizer_label(), vars, default_timeout_secs)?),
            None => None,
        };
        Ok(ResolvedStep {
            name: self.name.clone(),
            forward: self.run.resolve(&self.name, vars, default_timeout_secs)?,
            compensation,
            finalizer,
        })
    }
}

fn label_or(action: Option<&ActionDef>, fallback: impl FnOnce() -> String) -> String {
    action.and_then(|a| a.name.clone()).unwrap_or_else(fallback)
}

/// An action with all templates substituted, ready for the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAction {
    pub label: String,
    pub command: RemoteCommand,
    pub expect: ResultSchema,
}

/// A step with every action resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedStep {
    pub name: String,
    pub forward: ResolvedAction,
    pub compensation: Option<ResolvedAction>,
    pub finalizer: Option<ResolvedAction>,
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;
