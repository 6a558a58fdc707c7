// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for handling socket I/O.
//!
//! A connection carries a sequence of request/response pairs. Accept
//! returns as soon as the broker has stored the job; execution continues
//! in the job's own task.

use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, UnixListener};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use vj_adapters::RemoteExecutor;
use vj_core::Clock;
use vj_engine::{Broker, EngineError};
use vj_wire::{ErrorKind, ProtocolError, Request, Response, PROTOCOL_VERSION};

use crate::env::ipc_timeout;

/// Shared daemon context for all request handlers.
pub(crate) struct ListenCtx<E, C> {
    pub broker: Broker<E, C>,
    /// When set, TCP clients must provide this token in the Hello handshake.
    pub auth_token: Option<String>,
}

/// Listener task for accepting socket connections.
pub(crate) struct Listener<E, C> {
    unix: UnixListener,
    tcp: Option<TcpListener>,
    ctx: Arc<ListenCtx<E, C>>,
}

#[derive(Debug, Error)]
pub(crate) enum ConnectionError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Source of a connection (for auth decisions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConnectionSource {
    /// Local Unix socket, trusted
    Unix,
    /// Remote TCP, must authenticate in Hello
    Tcp,
}

impl<E: RemoteExecutor, C: Clock> Listener<E, C> {
    pub fn new(unix: UnixListener, tcp: Option<TcpListener>, ctx: Arc<ListenCtx<E, C>>) -> Self {
        Self { unix, tcp, ctx }
    }

    /// Accept connections until `shutdown` is cancelled.
    pub async fn run(self, shutdown: CancellationToken) {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                result = self.unix.accept() => match result {
                    Ok((stream, _)) => {
                        let (reader, writer) = stream.into_split();
                        self.spawn(reader, writer, ConnectionSource::Unix);
                    }
                    Err(e) => error!("Unix accept error: {}", e),
                },
                result = accept_tcp(self.tcp.as_ref()) => match result {
                    Ok((stream, addr)) => {
                        debug!("TCP connection from {}", addr);
                        let (reader, writer) = stream.into_split();
                        self.spawn(reader, writer, ConnectionSource::Tcp);
                    }
                    Err(e) => error!("TCP accept error: {}", e),
                },
            }
        }
        debug!("listener stopped");
    }

    fn spawn<R, W>(&self, reader: R, writer: W, source: ConnectionSource)
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let ctx = Arc::clone(&self.ctx);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(reader, writer, source, &ctx).await {
                log_connection_error(e);
            }
        });
    }
}

/// Pending forever when TCP is disabled, so `select!` only polls the Unix arm.
async fn accept_tcp(
    tcp: Option<&TcpListener>,
) -> std::io::Result<(tokio::net::TcpStream, std::net::SocketAddr)> {
    match tcp {
        Some(tcp) => tcp.accept().await,
        None => std::future::pending().await,
    }
}

fn log_connection_error(e: ConnectionError) {
    match e {
        ConnectionError::Protocol(ProtocolError::ConnectionClosed) => {
            debug!("Client disconnected")
        }
        ConnectionError::Protocol(ProtocolError::Timeout) => warn!("Connection timeout"),
        _ => error!("Connection error: {}", e),
    }
}

/// Serve requests on one connection until the client closes it.
///
/// A client may sit idle between requests indefinitely; the IPC timeout
/// applies only to a frame that has started to arrive.
///
/// TCP connections must open with a Hello carrying the daemon's token;
/// anything else gets one error response and the connection is dropped.
pub(crate) async fn handle_connection<R, W, E, C>(
    mut reader: R,
    mut writer: W,
    source: ConnectionSource,
    ctx: &ListenCtx<E, C>,
) -> Result<(), ConnectionError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    E: RemoteExecutor,
    C: Clock,
{
    let mut authenticated = source == ConnectionSource::Unix;
    loop {
        let request = match vj_wire::next_request(&mut reader, ipc_timeout()).await {
            Ok(request) => request,
            Err(ProtocolError::ConnectionClosed) => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        if !authenticated {
            if let Err(message) = authenticate(&request, ctx.auth_token.as_deref()) {
                warn!(reason = message, "rejected TCP request");
                let response = Response::error(ErrorKind::Validation, message);
                let _ = vj_wire::write_response(&mut writer, &response, ipc_timeout()).await;
                return Ok(());
            }
            authenticated = true;
        }

        // Polling is frequent; log it at debug
        if request.is_query() {
            debug!(request = ?request, "received query");
        } else {
            info!(request = ?request, "received request");
        }

        let response = handle_request(request, ctx);
        debug!("Sending response: {:?}", response);
        vj_wire::write_response(&mut writer, &response, ipc_timeout()).await?;
    }
}

/// Check the opening request of a TCP connection.
fn authenticate(request: &Request, expected: Option<&str>) -> Result<(), &'static str> {
    let Request::Hello { token, .. } = request else {
        return Err("TCP connections must start with Hello");
    };
    match (expected, token.as_deref()) {
        (None, _) => Ok(()),
        (Some(expected), Some(provided)) if provided == expected => Ok(()),
        (Some(_), _) => Err("unauthorized"),
    }
}

/// Handle a single request and return a response.
pub(crate) fn handle_request<E: RemoteExecutor, C: Clock>(
    request: Request,
    ctx: &ListenCtx<E, C>,
) -> Response {
    match request {
        Request::Ping => Response::Pong,

        Request::Hello { version, token: _ } => {
            if version != PROTOCOL_VERSION {
                warn!(client = %version, daemon = PROTOCOL_VERSION, "protocol version mismatch");
            }
            Response::Hello { version: PROTOCOL_VERSION.to_string() }
        }

        Request::Accept { operation, target, payload } => {
            match ctx.broker.accept(&operation, &target, &payload) {
                Ok(handle) => Response::Accepted { job_id: handle.id().clone() },
                Err(e) => error_response(e),
            }
        }

        Request::Status { job_id } => match ctx.broker.status(&job_id) {
            Ok(job) => Response::Job { job: Box::new(job) },
            Err(e) => error_response(e),
        },

        Request::ListJobs => Response::Jobs { jobs: ctx.broker.list() },
    }
}

fn error_response(e: EngineError) -> Response {
    let kind = match &e {
        EngineError::Validation(_) => ErrorKind::Validation,
        EngineError::Conflict { .. } => ErrorKind::Conflict,
        EngineError::NotFound(_) => ErrorKind::NotFound,
        EngineError::Internal(_) => ErrorKind::Internal,
    };
    Response::error(kind, e.to_string())
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
