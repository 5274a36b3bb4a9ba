// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error reporting for failures that are handled rather than propagated.
//!
//! The queue and sync layers swallow infrastructure errors so they never
//! crash calling code. Each swallowed error is handed to an
//! [`ErrorReporter`] together with a [`ReportContext`] naming where it
//! happened.

use std::error::Error as StdError;
use std::fmt;

/// Scope used by the encrypted queue store.
pub const SCOPE_QUEUE: &str = "offline.queue";
/// Scope used by the sync orchestrator.
pub const SCOPE_SYNC: &str = "offline.sync.manager";
/// Scope used by the startup hydration read.
pub const SCOPE_HYDRATION: &str = "offline.hydration";
/// Scope used by the connectivity observer.
pub const SCOPE_NETWORK: &str = "offline.network";

/// Where a reported error happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportContext {
    pub scope: &'static str,
    pub op: &'static str,
    /// Queue entry involved, if any.
    pub id: Option<String>,
}

impl ReportContext {
    pub fn new(scope: &'static str, op: &'static str) -> Self {
        ReportContext {
            scope,
            op,
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

impl fmt::Display for ReportContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.scope, self.op)?;
        if let Some(id) = &self.id {
            write!(f, " ({id})")?;
        }
        Ok(())
    }
}

/// Sink for handled errors.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &(dyn StdError + 'static), context: ReportContext);
}

/// Reporter that emits a `tracing` warning per error.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, error: &(dyn StdError + 'static), context: ReportContext) {
        tracing::warn!(
            scope = context.scope,
            op = context.op,
            id = context.id.as_deref().unwrap_or(""),
            error = %error,
            "offline subsystem error"
        );
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
