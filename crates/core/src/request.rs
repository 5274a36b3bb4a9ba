// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Request types flowing through the offline queue.
//!
//! Three shapes exist, in the order a write passes through them:
//!
//! - [`OutgoingRequest`]: what a caller is about to send. Any method, any
//!   extra fields the caller filled in.
//! - [`RequestSpec`]: the sanitized, allow-listed payload. Only mutation
//!   methods can be expressed.
//! - [`QueuedRequest`]: a spec plus the id and timestamp assigned at enqueue.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Request headers, kept ordered so serialized entries are stable.
pub type Headers = BTreeMap<String, String>;

/// HTTP methods that mutate server state and may be deferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MutationMethod {
    Post,
    Put,
    Patch,
    Delete,
}

impl MutationMethod {
    /// Returns the canonical upper-case method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationMethod::Post => "POST",
            MutationMethod::Put => "PUT",
            MutationMethod::Patch => "PATCH",
            MutationMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for MutationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for MutationMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "POST" => Ok(MutationMethod::Post),
            "PUT" => Ok(MutationMethod::Put),
            "PATCH" => Ok(MutationMethod::Patch),
            "DELETE" => Ok(MutationMethod::Delete),
            _ => Err(Error::InvalidMethod(s.to_string())),
        }
    }
}

/// A request a caller is about to issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutgoingRequest {
    pub url: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,
    /// Per-request timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl OutgoingRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        OutgoingRequest {
            url: url.into(),
            method: method.into(),
            ..Default::default()
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Headers::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout = Some(timeout_ms);
        self
    }

    /// Returns the method as a mutation method, if it is one.
    pub fn mutation_method(&self) -> Option<MutationMethod> {
        self.method.parse().ok()
    }
}

/// Sanitized request payload: the only fields that are ever persisted or
/// replayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSpec {
    pub url: String,
    pub method: MutationMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// A deferred mutation waiting in the offline queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedRequest {
    /// Unique within the queue, generated at enqueue time.
    pub id: String,
    pub url: String,
    pub method: MutationMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Enqueue time, stored as epoch milliseconds.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl QueuedRequest {
    /// Creates a new entry with a fresh id and the current time.
    pub fn new(spec: RequestSpec) -> Self {
        Self::with_identity(spec, Uuid::new_v4().to_string(), Utc::now())
    }

    /// Creates an entry with an explicit id and timestamp.
    pub fn with_identity(spec: RequestSpec, id: String, timestamp: DateTime<Utc>) -> Self {
        let RequestSpec {
            url,
            method,
            body,
            headers,
            timeout,
        } = spec;
        QueuedRequest {
            id,
            url,
            method,
            body,
            headers,
            timeout,
            timestamp,
        }
    }

    /// Returns the payload to replay, without the queue bookkeeping.
    pub fn spec(&self) -> RequestSpec {
        RequestSpec {
            url: self.url.clone(),
            method: self.method,
            body: self.body.clone(),
            headers: self.headers.clone(),
            timeout: self.timeout,
        }
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
