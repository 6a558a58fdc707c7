// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted executor for tests

use super::{ExecError, RemoteExecutor};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use vj_core::RemoteCommand;

/// What the fake returns for a matching command
#[derive(Debug, Clone)]
pub enum FakeResponse {
    /// Raw output text
    Output(String),
    Transport(String),
    Timeout,
    /// Wait, then respond. Waiting past the command's own timeout yields
    /// [`ExecError::Timeout`] at the deadline.
    Delayed(Duration, Box<FakeResponse>),
}

impl FakeResponse {
    /// Successful document with an optional payload
    pub fn ok(payload: Option<Value>) -> Self {
        let mut doc = json!({ "version": 1, "op_ret": 0, "op_errno": 0, "op_errstr": "" });
        if let Some(payload) = payload {
            doc["payload"] = payload;
        }
        FakeResponse::Output(doc.to_string())
    }

    /// Failure document carrying `message` as its error text
    pub fn fail(errno: i32, message: &str) -> Self {
        FakeResponse::Output(
            json!({ "version": 1, "op_ret": -1, "op_errno": errno, "op_errstr": message })
                .to_string(),
        )
    }

    pub fn delayed(self, by: Duration) -> Self {
        FakeResponse::Delayed(by, Box::new(self))
    }
}

struct Rule {
    pattern: String,
    response: FakeResponse,
    once: bool,
}

struct FakeExecutorState {
    rules: Vec<Rule>,
    calls: Vec<RemoteCommand>,
    default: FakeResponse,
}

/// Fake executor: commands are matched by substring against scripted
/// rules (first match wins), unmatched commands succeed with an empty
/// document. Every call is recorded.
#[derive(Clone)]
pub struct FakeExecutor {
    inner: Arc<Mutex<FakeExecutorState>>,
}

impl Default for FakeExecutor {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeExecutorState {
                rules: Vec::new(),
                calls: Vec::new(),
                default: FakeResponse::ok(None),
            })),
        }
    }
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to every command containing `pattern`.
    pub fn on(&self, pattern: &str, response: FakeResponse) -> &Self {
        self.push(pattern, response, false)
    }

    /// Respond to the next command containing `pattern`, then forget the rule.
    pub fn once(&self, pattern: &str, response: FakeResponse) -> &Self {
        self.push(pattern, response, true)
    }

    /// Response for commands no rule matches
    pub fn set_default(&self, response: FakeResponse) {
        self.inner.lock().default = response;
    }

    fn push(&self, pattern: &str, response: FakeResponse, once: bool) -> &Self {
        self.inner.lock().rules.push(Rule { pattern: pattern.to_string(), response, once });
        self
    }

    /// All recorded commands, in call order
    pub fn calls(&self) -> Vec<RemoteCommand> {
        self.inner.lock().calls.clone()
    }

    /// Command lines of all recorded calls
    pub fn commands(&self) -> Vec<String> {
        self.inner.lock().calls.iter().map(|c| c.command.clone()).collect()
    }

    /// Number of recorded calls whose command contains `pattern`
    pub fn count(&self, pattern: &str) -> usize {
        self.inner.lock().calls.iter().filter(|c| c.command.contains(pattern)).count()
    }

    fn respond(&self, command: &RemoteCommand) -> FakeResponse {
        let mut state = self.inner.lock();
        state.calls.push(command.clone());
        let matched = state.rules.iter().position(|r| command.command.contains(&r.pattern));
        match matched {
            Some(idx) if state.rules[idx].once => state.rules.remove(idx).response,
            Some(idx) => state.rules[idx].response.clone(),
            None => state.default.clone(),
        }
    }
}

#[async_trait]
impl RemoteExecutor for FakeExecutor {
    async fn execute(&self, command: &RemoteCommand) -> Result<String, ExecError> {
        let mut response = self.respond(command);
        let mut waited = Duration::ZERO;
        loop {
            match response {
                FakeResponse::Output(text) => return Ok(text),
                FakeResponse::Transport(msg) => return Err(ExecError::Transport(msg)),
                FakeResponse::Timeout => return Err(ExecError::Timeout(command.timeout())),
                FakeResponse::Delayed(by, next) => {
                    let remaining = command.timeout().saturating_sub(waited);
                    if by >= remaining {
                        tokio::time::sleep(remaining).await;
                        return Err(ExecError::Timeout(command.timeout()));
                    }
                    tokio::time::sleep(by).await;
                    waited += by;
                    response = *next;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
