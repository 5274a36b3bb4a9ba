// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! API execution for live and replayed requests.
//!
//! Provides a trait-based execution layer that enables:
//! - Real HTTP requests for production
//! - Mock executors for unit testing

use std::time::Duration;

use ob_core::{BoxFuture, Headers, OutgoingRequest, RequestSpec};
use reqwest::Method;
use serde_json::Value;
use url::Url;

/// Error type for request execution.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// The request did not complete within its timeout.
    #[error("request timed out after {0}ms")]
    Timeout(u64),

    /// The server answered with a non-2xx status.
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Connection or protocol failure.
    #[error("request failed: {0}")]
    Transport(String),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type for request execution.
pub type ExecResult<T> = Result<T, ExecError>;

/// Successful response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

/// Executes requests against the backend.
///
/// Non-2xx responses and timeouts are errors.
pub trait ApiExecutor: Send + Sync {
    fn execute<'a>(&'a self, request: &'a RequestSpec) -> BoxFuture<'a, ExecResult<ApiResponse>>;
}

/// HTTP executor using reqwest.
pub struct HttpExecutor {
    client: reqwest::Client,
    base: Url,
    default_timeout: Duration,
}

impl HttpExecutor {
    pub fn new(base: Url, default_timeout: Duration) -> ExecResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ExecError::InvalidRequest(e.to_string()))?;
        Ok(HttpExecutor {
            client,
            base,
            default_timeout,
        })
    }

    /// Sends a request live, whatever its method.
    pub async fn send(&self, request: &OutgoingRequest) -> ExecResult<ApiResponse> {
        let method = Method::from_bytes(request.method.trim().to_ascii_uppercase().as_bytes())
            .map_err(|e| ExecError::InvalidRequest(e.to_string()))?;
        self.dispatch(
            method,
            &request.url,
            request.body.as_ref(),
            request.headers.as_ref(),
            request.timeout,
        )
        .await
    }

    async fn dispatch(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        headers: Option<&Headers>,
        timeout_ms: Option<u64>,
    ) -> ExecResult<ApiResponse> {
        let url = self
            .base
            .join(url.trim())
            .map_err(|e| ExecError::InvalidRequest(format!("{url}: {e}")))?;
        let timeout = timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(self.default_timeout);

        let mut builder = self.client.request(method.clone(), url.clone()).timeout(timeout);
        for (name, value) in headers.into_iter().flatten() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        tracing::debug!(%method, %url, "sending request");
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ExecError::Timeout(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX))
            } else {
                ExecError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ExecError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(ApiResponse {
            status: status.as_u16(),
            body,
        })
    }
}

impl ApiExecutor for HttpExecutor {
    fn execute<'a>(&'a self, request: &'a RequestSpec) -> BoxFuture<'a, ExecResult<ApiResponse>> {
        Box::pin(async move {
            let method = Method::from_bytes(request.method.as_str().as_bytes())
                .map_err(|e| ExecError::InvalidRequest(e.to_string()))?;
            self.dispatch(
                method,
                &request.url,
                request.body.as_ref(),
                request.headers.as_ref(),
                request.timeout,
            )
            .await
        })
    }
}
