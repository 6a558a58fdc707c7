// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation plans and the TOML catalog that holds them

use crate::step::{ResolvedStep, StepDef};
use crate::template::{referenced_vars, UnboundVar};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use vj_core::Job;

/// Variables every job provides without declaring them
pub const RESERVED_VARS: &[&str] = &["target", "job_id"];

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("failed to read plan catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid plan catalog: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("operation {0} has no steps")]
    EmptyPlan(String),
    #[error("operation {operation} defines step {step:?} more than once")]
    DuplicateStep { operation: String, step: String },
    #[error("operation {operation} declares reserved variable {var}")]
    ReservedVar { operation: String, var: String },
    #[error("operation {operation} step {step:?} references undeclared variable ${{{var}}}")]
    UndeclaredVar { operation: String, step: String, var: String },
    #[error("operation {operation}: {source}")]
    Unbound {
        operation: String,
        #[source]
        source: UnboundVar,
    },
}

/// Ordered, immutable step list for one operation type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperationPlan {
    /// Operation type, filled from the catalog key
    #[serde(skip)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Payload fields the caller must supply
    #[serde(default)]
    pub vars: Vec<String>,
    #[serde(default, rename = "step")]
    pub steps: Vec<StepDef>,
    /// Present when the operation is recognized but not offered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unsupported: Option<String>,
}

impl OperationPlan {
    pub fn step(&self, name: &str) -> Option<&StepDef> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// Template variables available to a job of this plan.
    pub fn bindings(job: &Job) -> BTreeMap<String, String> {
        let mut vars = job.payload.clone();
        vars.insert("target".to_string(), job.target.to_string());
        vars.insert("job_id".to_string(), job.id.to_string());
        vars
    }

    /// Resolve every step against `job`'s payload.
    pub fn resolve(
        &self,
        job: &Job,
        default_timeout_secs: u64,
    ) -> Result<Vec<ResolvedStep>, PlanError> {
        let vars = Self::bindings(job);
        self.steps
            .iter()
            .map(|s| s.resolve(&vars, default_timeout_secs))
            .collect::<Result<_, _>>()
            .map_err(|source| PlanError::Unbound { operation: self.name.clone(), source })
    }

    fn validate(&self) -> Result<(), PlanError> {
        if let Some(var) = self.vars.iter().find(|v| RESERVED_VARS.contains(&v.as_str())) {
            return Err(PlanError::ReservedVar { operation: self.name.clone(), var: var.clone() });
        }
        if self.unsupported.is_some() {
            return Ok(());
        }
        if self.steps.is_empty() {
            return Err(PlanError::EmptyPlan(self.name.clone()));
        }

        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.name.as_str()) {
                return Err(PlanError::DuplicateStep {
                    operation: self.name.clone(),
                    step: step.name.clone(),
                });
            }
            let undeclared = step
                .actions()
                .flat_map(|a| a.templates())
                .flat_map(referenced_vars)
                .find(|v| !RESERVED_VARS.contains(v) && !self.vars.iter().any(|d| d == v));
            if let Some(var) = undeclared {
                return Err(PlanError::UndeclaredVar {
                    operation: self.name.clone(),
                    step: step.name.clone(),
                    var: var.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    #[serde(default)]
    operation: BTreeMap<String, OperationPlan>,
}

/// Operation type → plan. Validated once at load time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanCatalog {
    plans: BTreeMap<String, OperationPlan>,
}

impl PlanCatalog {
    pub fn parse(content: &str) -> Result<Self, PlanError> {
        let file: CatalogFile = toml::from_str(content)?;
        let mut plans = BTreeMap::new();
        for (name, mut plan) in file.operation {
            plan.name = name.clone();
            plan.validate()?;
            plans.insert(name, plan);
        }
        Ok(Self { plans })
    }

    pub fn load(path: &Path) -> Result<Self, PlanError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| PlanError::Io { path: path.to_path_buf(), source })?;
        let catalog = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), plans = catalog.plans.len(), "loaded plan catalog");
        Ok(catalog)
    }

    pub fn get(&self, operation: &str) -> Option<&OperationPlan> {
        self.plans.get(operation)
    }

    pub fn operations(&self) -> impl Iterator<Item = &str> {
        self.plans.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
