// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vj-engine: asynchronous operation execution
//!
//! The [`Broker`] accepts requests and answers status queries, the
//! [`Orchestrator`] drives one job's steps through a
//! [`RemoteExecutor`](vj_adapters::RemoteExecutor), and the [`JobStore`]
//! is the only state shared between them.

mod broker;
mod config;
mod error;
mod lease;
pub mod orchestrator;
pub mod parser;
mod recovery;
mod store;

pub use broker::{Broker, JobHandle};
pub use config::EngineConfig;
pub use error::{EngineError, StepError};
pub use lease::{Lease, LeaseConflict, ResourceLeases};
pub use orchestrator::Orchestrator;
pub use parser::{decode, ParseError, SUPPORTED_VERSIONS};
pub use recovery::{recover_interrupted, RecoveryReport};
pub use store::{FlushHook, JobStore, JobWriter, StoreError};

/// Adapters and shared state the engine runs against
#[derive(Clone)]
pub struct EngineDeps<E, C> {
    pub executor: E,
    pub clock: C,
    pub store: JobStore,
}
