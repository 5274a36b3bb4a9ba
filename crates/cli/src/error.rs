// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::{ExecError, GatewayError, NetworkError};

/// All possible errors surfaced by the outbox CLI.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] ob_core::Error),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("config error: {0}")]
    Config(String),

    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid header '{0}'\n  hint: headers are written as 'Name: value'")]
    InvalidHeader(String),

    #[error("invalid body: {0}\n  hint: --body takes a JSON document, e.g. '{{\"qty\": 1}}'")]
    InvalidBody(String),

    #[error("offline: {method} {url} was not sent\n  hint: only mutations to mounted routes are deferred while offline")]
    Offline { method: String, url: String },

    #[error("failed to clear the offline queue\n  hint: run with RUST_LOG=debug for details")]
    ClearFailed,
}

/// A specialized Result type for outbox operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
