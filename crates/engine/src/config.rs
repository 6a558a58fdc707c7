// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

/// Engine tuning knobs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Timeout for actions that do not set their own
    pub default_timeout_secs: u64,
    /// Extra attempts after an executor timeout. Zero makes the first
    /// timeout a terminal step failure.
    pub timeout_retries: u32,
    /// How long terminal jobs stay queryable
    pub retention: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: 10,
            timeout_retries: 0,
            retention: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl EngineConfig {
    vj_core::setters! {
        set {
            default_timeout_secs: u64,
            timeout_retries: u32,
            retention: Duration,
        }
    }
}
