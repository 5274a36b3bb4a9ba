// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the transport module.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashSet;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use ob_core::{BoxFuture, OutgoingRequest, RequestSpec};
use serde_json::json;
use url::Url;

use super::test_helpers::post_spec;
use super::transport::{ApiExecutor, ApiResponse, ExecError, ExecResult, HttpExecutor};

/// Mock executor for testing without a server.
#[derive(Clone, Default)]
pub struct MockExecutor {
    /// Requests that were executed, in order.
    sent: Arc<Mutex<Vec<RequestSpec>>>,
    /// URLs that answer with 503.
    failing: Arc<Mutex<HashSet<String>>>,
    /// Simulated latency per request.
    delay: Option<Duration>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        MockExecutor {
            delay: Some(delay),
            ..Default::default()
        }
    }

    /// Make requests to `url` fail.
    pub fn fail_url(&self, url: &str) {
        self.failing.lock().unwrap().insert(url.to_string());
    }

    /// Make requests to `url` succeed again.
    pub fn heal_url(&self, url: &str) {
        self.failing.lock().unwrap().remove(url);
    }

    /// Get all requests that were executed.
    pub fn sent(&self) -> Vec<RequestSpec> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_urls(&self) -> Vec<String> {
        self.sent().into_iter().map(|spec| spec.url).collect()
    }

    /// Highest number of requests observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl ApiExecutor for MockExecutor {
    fn execute<'a>(&'a self, request: &'a RequestSpec) -> BoxFuture<'a, ExecResult<ApiResponse>> {
        Box::pin(async move {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.sent.lock().unwrap().push(request.clone());
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.failing.lock().unwrap().contains(&request.url) {
                Err(ExecError::Status {
                    status: 503,
                    body: "unavailable".into(),
                })
            } else {
                Ok(ApiResponse {
                    status: 200,
                    body: String::new(),
                })
            }
        })
    }
}

/// Serves a single HTTP exchange and returns the raw request it read.
fn serve_once(status_line: &'static str) -> (Url, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let request = read_request(&mut stream);
        let response =
            format!("{status_line}\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok");
        stream.write_all(response.as_bytes()).unwrap();
        request
    });
    (base, handle)
}

/// Accepts a connection and never answers it.
fn serve_silent(hold: Duration) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let _ = read_request(&mut stream);
            thread::sleep(hold);
        }
    });
    base
}

/// Base URL of a port nothing listens on.
fn closed_port() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{addr}")).unwrap()
}

fn read_request(stream: &mut impl Read) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

#[tokio::test]
async fn test_mock_executor_records_and_fails() {
    let executor = MockExecutor::new();
    executor.fail_url("/api/v1/orders");

    let err = executor.execute(&post_spec("/api/v1/orders")).await;
    assert!(matches!(err, Err(ExecError::Status { status: 503, .. })));

    executor.heal_url("/api/v1/orders");
    let ok = executor.execute(&post_spec("/api/v1/orders")).await.unwrap();
    assert_eq!(ok.status, 200);
    assert_eq!(executor.sent().len(), 2);
}

#[tokio::test]
async fn test_http_executor_sends_method_body_and_headers() {
    let (base, server) = serve_once("HTTP/1.1 201 Created");
    let executor = HttpExecutor::new(base, Duration::from_secs(5)).unwrap();

    let request = OutgoingRequest::new("POST", "/api/v1/orders")
        .with_body(json!({"qty": 3}))
        .with_header("X-Trace", "abc");
    let spec = ob_core::sanitize(&request).unwrap();
    let response = executor.execute(&spec).await.unwrap();

    assert_eq!(response.status, 201);
    assert_eq!(response.body, "ok");

    let raw = server.join().unwrap();
    assert!(raw.starts_with("POST /api/v1/orders HTTP/1.1"));
    assert!(raw.to_ascii_lowercase().contains("x-trace: abc"));
    assert!(raw.contains(r#""qty":3"#));
}

#[tokio::test]
async fn test_http_executor_non_2xx_is_error() {
    let (base, server) = serve_once("HTTP/1.1 500 Internal Server Error");
    let executor = HttpExecutor::new(base, Duration::from_secs(5)).unwrap();

    let result = executor.execute(&post_spec("/api/v1/orders")).await;
    match result {
        Err(ExecError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "ok");
        }
        other => panic!("expected status error, got {other:?}"),
    }
    server.join().unwrap();
}

#[tokio::test]
async fn test_http_executor_request_timeout_overrides_default() {
    let base = serve_silent(Duration::from_secs(3));
    let executor = HttpExecutor::new(base, Duration::from_secs(30)).unwrap();

    let request = OutgoingRequest::new("PUT", "/api/v1/orders/1").with_timeout(100);
    let spec = ob_core::sanitize(&request).unwrap();
    let result = executor.execute(&spec).await;

    assert!(matches!(result, Err(ExecError::Timeout(100))));
}

#[tokio::test]
async fn test_http_executor_connection_refused_is_transport_error() {
    let executor = HttpExecutor::new(closed_port(), Duration::from_secs(5)).unwrap();
    let result = executor.execute(&post_spec("/api/v1/orders")).await;
    assert!(matches!(result, Err(ExecError::Transport(_))));
}

#[tokio::test]
async fn test_http_executor_send_accepts_any_method() {
    let (base, server) = serve_once("HTTP/1.1 200 OK");
    let executor = HttpExecutor::new(base, Duration::from_secs(5)).unwrap();

    let response = executor
        .send(&OutgoingRequest::new("get", "/api/v1/orders"))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert!(server.join().unwrap().starts_with("GET /api/v1/orders "));
}

#[tokio::test]
async fn test_http_executor_send_rejects_malformed_method() {
    let executor = HttpExecutor::new(closed_port(), Duration::from_secs(5)).unwrap();
    let result = executor
        .send(&OutgoingRequest::new("NOT A METHOD", "/api/v1/orders"))
        .await;
    assert!(matches!(result, Err(ExecError::InvalidRequest(_))));
}
