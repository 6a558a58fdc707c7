// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Length-prefixed JSON framing

use crate::{Request, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest frame either side will accept
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("message too large: {0} bytes")]
    MessageTooLarge(usize),
    #[error("connection closed")]
    ConnectionClosed,
    #[error("timed out")]
    Timeout,
}

/// Serialize to JSON (no length prefix).
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(value)?)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Read one length-prefixed frame.
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, ProtocolError> {
    let mut len_buf = [0u8; 4];
    read_prefix(reader, &mut len_buf).await?;
    read_body(reader, len_buf).await
}

async fn read_prefix<R: AsyncRead + Unpin>(
    reader: &mut R,
    buf: &mut [u8],
) -> Result<(), ProtocolError> {
    match reader.read_exact(buf).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            Err(ProtocolError::ConnectionClosed)
        }
        Err(e) => Err(e.into()),
    }
}

async fn read_body<R: AsyncRead + Unpin>(
    reader: &mut R,
    len_buf: [u8; 4],
) -> Result<Vec<u8>, ProtocolError> {
    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge(len));
    }
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    Ok(buf)
}

/// Write one length-prefixed frame.
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    data: &[u8],
) -> Result<(), ProtocolError> {
    if data.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge(data.len()));
    }
    writer.write_all(&(data.len() as u32).to_be_bytes()).await?;
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

async fn with_timeout<T>(
    timeout: Duration,
    fut: impl std::future::Future<Output = Result<T, ProtocolError>>,
) -> Result<T, ProtocolError> {
    tokio::time::timeout(timeout, fut).await.map_err(|_| ProtocolError::Timeout)?
}

async fn read_value<T: DeserializeOwned, R: AsyncRead + Unpin>(
    reader: &mut R,
    timeout: Duration,
) -> Result<T, ProtocolError> {
    let bytes = with_timeout(timeout, read_message(reader)).await?;
    decode(&bytes)
}

async fn write_value<T: Serialize, W: AsyncWrite + Unpin>(
    writer: &mut W,
    value: &T,
    timeout: Duration,
) -> Result<(), ProtocolError> {
    let bytes = encode(value)?;
    with_timeout(timeout, write_message(writer, &bytes)).await
}

pub async fn read_request<R: AsyncRead + Unpin>(
    reader: &mut R,
    timeout: Duration,
) -> Result<Request, ProtocolError> {
    read_value(reader, timeout).await
}

/// Wait for the next request on a long-lived connection.
///
/// An idle peer may take as long as it likes to start a frame; `timeout`
/// only bounds the rest of the frame once its first byte has arrived.
pub async fn next_request<R: AsyncRead + Unpin>(
    reader: &mut R,
    timeout: Duration,
) -> Result<Request, ProtocolError> {
    let mut len_buf = [0u8; 4];
    if reader.read(&mut len_buf[..1]).await? == 0 {
        return Err(ProtocolError::ConnectionClosed);
    }
    let bytes = with_timeout(timeout, async {
        read_prefix(reader, &mut len_buf[1..]).await?;
        read_body(reader, len_buf).await
    })
    .await?;
    decode(&bytes)
}

pub async fn write_request<W: AsyncWrite + Unpin>(
    writer: &mut W,
    request: &Request,
    timeout: Duration,
) -> Result<(), ProtocolError> {
    write_value(writer, request, timeout).await
}

pub async fn read_response<R: AsyncRead + Unpin>(
    reader: &mut R,
    timeout: Duration,
) -> Result<Response, ProtocolError> {
    read_value(reader, timeout).await
}

pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &Response,
    timeout: Duration,
) -> Result<(), ProtocolError> {
    write_value(writer, response, timeout).await
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
