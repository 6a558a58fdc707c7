// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon client: one connection per request.

use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpStream, UnixStream};
use vj_core::{Job, JobId};
use vj_wire::{ErrorKind, ProtocolError, Request, Response, PROTOCOL_VERSION};

use crate::env;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon not running (socket {})", .0.display())]
    NotRunning(PathBuf),

    #[error("could not determine state directory")]
    NoStateDir,

    #[error("could not reach daemon: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The daemon answered with an error response
    #[error("{message}")]
    Rejected { kind: ErrorKind, message: String },

    #[error("unexpected response from daemon: {0}")]
    Unexpected(String),
}

impl ClientError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ClientError::Rejected { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Where the daemon listens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Unix(PathBuf),
    Tcp { addr: String, token: Option<String> },
}

#[derive(Debug, Clone)]
pub struct DaemonClient {
    endpoint: Endpoint,
    timeout: Duration,
}

impl DaemonClient {
    pub fn new(endpoint: Endpoint, timeout: Duration) -> Self {
        Self { endpoint, timeout }
    }

    /// `VJ_DAEMON_ADDR` when set, otherwise the local daemon socket.
    pub fn from_env() -> Result<Self, ClientError> {
        let endpoint = match env::daemon_addr() {
            Some(addr) => Endpoint::Tcp { addr, token: env::auth_token() },
            None => Endpoint::Unix(env::state_dir().ok_or(ClientError::NoStateDir)?.join("daemon.sock")),
        };
        Ok(Self::new(endpoint, env::ipc_timeout()))
    }

    /// Send one request and wait for its response.
    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        match &self.endpoint {
            Endpoint::Unix(path) => {
                let stream = UnixStream::connect(path).await.map_err(|e| match e.kind() {
                    std::io::ErrorKind::NotFound | std::io::ErrorKind::ConnectionRefused => {
                        ClientError::NotRunning(path.clone())
                    }
                    _ => ClientError::Io(e),
                })?;
                let (mut reader, mut writer) = stream.into_split();
                self.exchange(&mut reader, &mut writer, request).await
            }
            Endpoint::Tcp { addr, token } => {
                let stream = TcpStream::connect(addr.as_str()).await?;
                let (mut reader, mut writer) = stream.into_split();
                let hello =
                    Request::Hello { version: PROTOCOL_VERSION.to_string(), token: token.clone() };
                match self.exchange(&mut reader, &mut writer, &hello).await? {
                    Response::Hello { .. } => {}
                    other => return Self::reject(other),
                }
                self.exchange(&mut reader, &mut writer, request).await
            }
        }
    }

    async fn exchange<R, W>(
        &self,
        reader: &mut R,
        writer: &mut W,
        request: &Request,
    ) -> Result<Response, ClientError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        vj_wire::write_request(writer, request, self.timeout).await?;
        Ok(vj_wire::read_response(reader, self.timeout).await?)
    }

    fn reject<T>(response: Response) -> Result<T, ClientError> {
        match response {
            Response::Error { kind, message } => Err(ClientError::Rejected { kind, message }),
            other => Err(ClientError::Unexpected(format!("{other:?}"))),
        }
    }

    pub async fn accept(
        &self,
        operation: &str,
        target: &str,
        payload: Value,
    ) -> Result<JobId, ClientError> {
        let request = Request::Accept {
            operation: operation.to_string(),
            target: target.to_string(),
            payload,
        };
        match self.send(&request).await? {
            Response::Accepted { job_id } => Ok(job_id),
            other => Self::reject(other),
        }
    }

    pub async fn job(&self, id: &JobId) -> Result<Job, ClientError> {
        match self.send(&Request::Status { job_id: id.clone() }).await? {
            Response::Job { job } => Ok(*job),
            other => Self::reject(other),
        }
    }

    pub async fn jobs(&self) -> Result<Vec<Job>, ClientError> {
        match self.send(&Request::ListJobs).await? {
            Response::Jobs { jobs } => Ok(jobs),
            other => Self::reject(other),
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
