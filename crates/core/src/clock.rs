// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wall-clock source for job timestamps

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of wall-clock time in epoch milliseconds
pub trait Clock: Clone + Send + Sync + 'static {
    fn epoch_ms(&self) -> u64;
}

/// Real system clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_ms(&self) -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
    }
}

/// Manually driven clock for tests
#[derive(Clone, Debug)]
pub struct FakeClock {
    epoch_ms: Arc<AtomicU64>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self::at(1_000_000)
    }

    pub fn at(epoch_ms: u64) -> Self {
        Self { epoch_ms: Arc::new(AtomicU64::new(epoch_ms)) }
    }

    pub fn advance(&self, by: Duration) {
        self.epoch_ms.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn set_epoch_ms(&self, ms: u64) {
        self.epoch_ms.store(ms, Ordering::SeqCst);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn epoch_ms(&self) -> u64 {
        self.epoch_ms.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
