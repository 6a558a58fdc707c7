// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol between `vj` and `vjd`.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod request;
mod response;
mod wire;

pub use request::Request;
pub use response::{ErrorKind, Response};
pub use wire::{decode, encode, read_message, write_message, ProtocolError, MAX_MESSAGE_SIZE};
pub use wire::{next_request, read_request, read_response, write_request, write_response};

/// Bumped when a request or response shape changes
pub const PROTOCOL_VERSION: &str = "1";
