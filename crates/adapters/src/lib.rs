// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vj-adapters: transports that run commands on storage nodes

pub mod executor;
pub mod subprocess;

pub use executor::{
    ExecError, LocalExecutor, RemoteExecutor, SshExecutor, Transport, TransportExecutor,
};

#[cfg(any(test, feature = "test-support"))]
pub use executor::{FakeExecutor, FakeResponse};
