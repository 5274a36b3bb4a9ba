// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! One-time read of the persisted queue at process start.

use chrono::{DateTime, Utc};
use ob_core::report::SCOPE_HYDRATION;
use ob_core::{ErrorReporter, QueuedRequest, ReportContext};

use super::queue::OfflineQueue;

/// What was found in the queue at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hydration {
    pub entries: Vec<QueuedRequest>,
}

impl Hydration {
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Enqueue time of the oldest entry.
    pub fn oldest(&self) -> Option<DateTime<Utc>> {
        self.entries.iter().map(|entry| entry.timestamp).min()
    }
}

/// Reads the queue once for diagnostics. Does not start a sync pass.
///
/// Failures are reported and treated as an empty queue.
pub async fn hydrate(queue: &OfflineQueue, reporter: &dyn ErrorReporter) -> Hydration {
    let entries = match queue.snapshot().await {
        Ok(entries) => entries,
        Err(e) => {
            reporter.report(&e, ReportContext::new(SCOPE_HYDRATION, "hydrate"));
            Vec::new()
        }
    };

    let hydration = Hydration { entries };
    tracing::info!(
        pending = hydration.pending(),
        oldest = ?hydration.oldest(),
        "hydrated offline queue"
    );
    hydration
}
