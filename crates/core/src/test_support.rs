// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::ResourceId;

/// Parse a resource ID known to be valid in test fixtures.
pub fn rid(name: &str) -> ResourceId {
    match ResourceId::parse(name) {
        Ok(id) => id,
        Err(e) => unreachable!("invalid test resource id {name:?}: {e}"),
    }
}

/// Proptest strategies for core types.
pub mod strategies {
    use crate::job::JobState;
    use proptest::prelude::*;

    pub fn arb_job_state() -> impl Strategy<Value = JobState> {
        prop_oneof![
            Just(JobState::Pending),
            Just(JobState::InProgress),
            Just(JobState::Completed),
            Just(JobState::Failed),
        ]
    }

    /// Identifier strings that pass resource validation
    pub fn arb_resource_name() -> impl Strategy<Value = String> {
        "[A-Za-z0-9][A-Za-z0-9._-]{0,30}"
    }
}
