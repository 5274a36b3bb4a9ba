// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use ob_core::OutgoingRequest;

use super::Context;
use crate::error::{Error, Result};

pub async fn run(
    ctx: &Context,
    method: String,
    url: String,
    body: Option<String>,
    headers: Vec<String>,
    timeout: Option<u64>,
) -> Result<()> {
    let request = build_request(method, url, body.as_deref(), &headers, timeout)?;

    if ctx.gateway.queue_request_if_offline(&request).await? {
        println!(
            "queued {} {}",
            request.method.trim().to_ascii_uppercase(),
            request.url.trim()
        );
        return Ok(());
    }

    if !ctx.observer.is_online() {
        return Err(Error::Offline {
            method: request.method,
            url: request.url,
        });
    }

    let response = ctx.executor.send(&request).await?;
    println!("{}", response.status);
    if !response.body.is_empty() {
        println!("{}", response.body);
    }
    Ok(())
}

/// Builds the request from command-line pieces.
pub(crate) fn build_request(
    method: String,
    url: String,
    body: Option<&str>,
    headers: &[String],
    timeout: Option<u64>,
) -> Result<OutgoingRequest> {
    let mut request = OutgoingRequest::new(method, url);
    if let Some(body) = body {
        let value =
            serde_json::from_str(body).map_err(|e| Error::InvalidBody(e.to_string()))?;
        request = request.with_body(value);
    }
    for raw in headers {
        let (name, value) = parse_header(raw)?;
        request = request.with_header(name, value);
    }
    if let Some(timeout) = timeout {
        request = request.with_timeout(timeout);
    }
    Ok(request)
}

/// Parses `Name: value`.
pub(crate) fn parse_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| Error::InvalidHeader(raw.to_string()))?;
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(Error::InvalidHeader(raw.to_string()));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

#[cfg(test)]
#[path = "send_tests.rs"]
mod tests;
