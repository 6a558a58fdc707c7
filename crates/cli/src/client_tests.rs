// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use tokio::net::{TcpListener, UnixListener};
use vj_core::JobState;

const TIMEOUT: Duration = Duration::from_secs(2);

/// Serve one connection, answering each request with the next canned
/// response, and hand back the requests that arrived.
async fn serve_once<S>(stream: S, responses: Vec<Response>) -> Vec<Request>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut reader, mut writer) = tokio::io::split(stream);
    let mut seen = Vec::new();
    for response in responses {
        let request = vj_wire::read_request(&mut reader, TIMEOUT).await.unwrap();
        seen.push(request);
        vj_wire::write_response(&mut writer, &response, TIMEOUT).await.unwrap();
    }
    seen
}

async fn unix_pair(
    responses: Vec<Response>,
) -> (DaemonClient, tokio::task::JoinHandle<Vec<Request>>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daemon.sock");
    let listener = UnixListener::bind(&path).unwrap();
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        serve_once(stream, responses).await
    });
    (DaemonClient::new(Endpoint::Unix(path), TIMEOUT), server, dir)
}

#[tokio::test]
async fn missing_socket_means_not_running() {
    let dir = tempfile::tempdir().unwrap();
    let client = DaemonClient::new(Endpoint::Unix(dir.path().join("daemon.sock")), TIMEOUT);
    let err = client.jobs().await.unwrap_err();
    assert!(matches!(err, ClientError::NotRunning(_)), "{err}");
}

#[tokio::test]
async fn accept_returns_job_id() {
    let id = JobId::from_string("job-abc");
    let (client, server, _dir) =
        unix_pair(vec![Response::Accepted { job_id: id.clone() }]).await;

    let got = client.accept("snapshot.clone", "snap1", json!({"host": "n1"})).await.unwrap();
    assert_eq!(got, id);

    let seen = server.await.unwrap();
    assert_eq!(
        seen,
        vec![Request::Accept {
            operation: "snapshot.clone".to_string(),
            target: "snap1".to_string(),
            payload: json!({"host": "n1"}),
        }]
    );
}

#[tokio::test]
async fn error_response_becomes_rejected() {
    let (client, _server, _dir) =
        unix_pair(vec![Response::error(ErrorKind::Conflict, "snap1 is busy")]).await;

    let err = client.accept("snapshot.destroy", "snap1", json!({})).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Conflict));
    assert_eq!(err.to_string(), "snap1 is busy");
}

#[tokio::test]
async fn mismatched_response_is_unexpected() {
    let (client, _server, _dir) = unix_pair(vec![Response::Pong]).await;
    let err = client.job(&JobId::from_string("job-1")).await.unwrap_err();
    assert!(matches!(err, ClientError::Unexpected(_)), "{err}");
    assert_eq!(err.kind(), None);
}

#[tokio::test]
async fn status_unboxes_job() {
    let job = Job::builder().id("job-1").state(JobState::InProgress).build();
    let (client, _server, _dir) = unix_pair(vec![Response::Job { job: Box::new(job.clone()) }]).await;
    assert_eq!(client.job(&job.id).await.unwrap(), job);
}

#[tokio::test]
async fn tcp_sends_hello_with_token_first() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        serve_once(
            stream,
            vec![Response::Hello { version: PROTOCOL_VERSION.to_string() }, Response::Jobs { jobs: vec![] }],
        )
        .await
    });

    let client =
        DaemonClient::new(Endpoint::Tcp { addr, token: Some("s3cret".to_string()) }, TIMEOUT);
    assert!(client.jobs().await.unwrap().is_empty());

    let seen = server.await.unwrap();
    assert_eq!(
        seen,
        vec![
            Request::Hello { version: PROTOCOL_VERSION.to_string(), token: Some("s3cret".to_string()) },
            Request::ListJobs,
        ]
    );
}

#[tokio::test]
async fn tcp_rejected_hello_surfaces_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        serve_once(stream, vec![Response::error(ErrorKind::Validation, "unauthorized")]).await
    });

    let client = DaemonClient::new(Endpoint::Tcp { addr, token: None }, TIMEOUT);
    let err = client.jobs().await.unwrap_err();
    assert_eq!(err.to_string(), "unauthorized");
}
