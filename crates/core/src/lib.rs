// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vj-core: shared types for the voljobs operation engine

pub mod macros;

pub mod clock;
pub mod command;
pub mod id;
pub mod job;
pub mod resource;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use command::{CommandResult, RemoteCommand};
pub use id::short;
#[cfg(any(test, feature = "test-support"))]
pub use job::JobBuilder;
pub use job::{
    Job, JobConfig, JobId, JobState, StepOutcome, StepPhase, StepRecord, TransitionError,
};
pub use resource::{validate_name, ResourceId, ResourceIdError, MAX_RESOURCE_ID_LEN};
