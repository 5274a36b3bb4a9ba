// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Gateway consulted before every write.
//!
//! ```text
//! online?  ── yes ──► Ok(false)       caller sends live
//!   │ no
//! mutation? ─ no ───► Ok(false)       caller sends live and fails on its own
//!   │ yes
//! queueable? ─ no ──► NotQueueable
//!   │ yes
//! persisted? ─ no ──► QueuePersistFailed
//!   │ yes
//!   └───────────────► Ok(true)        accepted for later delivery
//! ```

use std::sync::Arc;

use ob_core::{EligibilityContract, OutgoingRequest};

use super::connectivity::ConnectivityObserver;
use super::queue::OfflineQueue;

/// Error type for gateway decisions the caller must act on.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The write cannot be deferred.
    #[error("request not allowed to be queued: {method} {url}\n  hint: only POST, PUT, PATCH and DELETE requests to mounted routes can be deferred while offline")]
    NotQueueable { method: String, url: String },

    /// The write was eligible but could not be saved.
    #[error("queue persistence failed: {method} {url} was not saved for later delivery")]
    QueuePersistFailed { method: String, url: String },
}

/// Decides between queueing a write and letting it go out live.
pub struct RequestGateway {
    observer: Arc<ConnectivityObserver>,
    contract: Arc<EligibilityContract>,
    queue: Arc<OfflineQueue>,
}

impl RequestGateway {
    pub fn new(
        observer: Arc<ConnectivityObserver>,
        contract: Arc<EligibilityContract>,
        queue: Arc<OfflineQueue>,
    ) -> Self {
        RequestGateway {
            observer,
            contract,
            queue,
        }
    }

    /// Queues the request if offline.
    ///
    /// Returns `Ok(true)` when the request was accepted for later delivery;
    /// no live response exists in that case. Returns `Ok(false)` when the
    /// caller should send it live.
    pub async fn queue_request_if_offline(
        &self,
        request: &OutgoingRequest,
    ) -> Result<bool, GatewayError> {
        if self.observer.is_online() {
            return Ok(false);
        }
        if request.mutation_method().is_none() {
            tracing::debug!(method = %request.method, url = %request.url, "not a mutation, not queueing");
            return Ok(false);
        }

        let not_queueable = || GatewayError::NotQueueable {
            method: request.method.clone(),
            url: request.url.clone(),
        };
        if !self.contract.is_queueable(request) {
            return Err(not_queueable());
        }
        let spec = self.contract.sanitize(request).map_err(|_| not_queueable())?;

        let (method, url) = (spec.method.to_string(), spec.url.clone());
        if !self.queue.add_to_queue(spec).await {
            return Err(GatewayError::QueuePersistFailed { method, url });
        }

        tracing::info!(%method, %url, "deferred request while offline");
        Ok(true)
    }
}
