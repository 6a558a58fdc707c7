// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vj-plan: operation plans as immutable, serializable step descriptors
//!
//! A plan catalog maps each operation type to an ordered list of steps.
//! Each step names a forward action and, optionally, a compensation
//! (run only if a later step fails) and a finalizer (run unconditionally).
//! Catalogs are plain TOML so in-flight steps can be logged, inspected and
//! replayed during crash recovery.

mod builtin;
mod catalog;
mod payload;
mod schema;
mod step;
pub mod template;

pub use builtin::{builtin_catalog, BUILTIN_CATALOG};
pub use catalog::{OperationPlan, PlanCatalog, PlanError};
pub use payload::{validate_payload, PayloadError};
pub use schema::ResultSchema;
pub use step::{ActionDef, ResolvedAction, ResolvedStep, StepDef};
