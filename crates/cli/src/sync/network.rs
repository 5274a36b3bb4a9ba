// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Network status sources.
//!
//! Provides a trait-based network status layer that enables:
//! - HTTP reachability probing for production
//! - A manually switched source for `--offline` and tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use ob_core::BoxFuture;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Error type for network status reads.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// The probe could not be built or sent.
    #[error("network probe failed: {0}")]
    Probe(String),
}

/// Result type for network status reads.
pub type NetworkResult<T> = Result<T, NetworkError>;

/// Snapshot of the platform's network status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkState {
    pub connected: bool,
}

impl NetworkState {
    pub fn online() -> Self {
        NetworkState { connected: true }
    }

    pub fn offline() -> Self {
        NetworkState { connected: false }
    }
}

/// Source of network status.
pub trait NetworkStatus: Send + Sync {
    /// Reads the current status afresh.
    fn fetch(&self) -> BoxFuture<'_, NetworkResult<NetworkState>>;

    /// Returns a receiver that observes every status change.
    fn watch(&self) -> watch::Receiver<NetworkState>;
}

/// Network status that only changes when told to.
pub struct ManualNetwork {
    tx: watch::Sender<NetworkState>,
}

impl ManualNetwork {
    pub fn new(connected: bool) -> Self {
        let (tx, _rx) = watch::channel(NetworkState { connected });
        ManualNetwork { tx }
    }

    /// Switches the status, notifying watchers if it changed.
    pub fn set_connected(&self, connected: bool) {
        self.tx.send_if_modified(|state| {
            let changed = state.connected != connected;
            state.connected = connected;
            changed
        });
    }

    pub fn is_connected(&self) -> bool {
        self.tx.borrow().connected
    }
}

impl NetworkStatus for ManualNetwork {
    fn fetch(&self) -> BoxFuture<'_, NetworkResult<NetworkState>> {
        let state = *self.tx.borrow();
        Box::pin(async move { Ok(state) })
    }

    fn watch(&self) -> watch::Receiver<NetworkState> {
        self.tx.subscribe()
    }
}

/// Configuration for the HTTP reachability probe.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// URL probed with a `HEAD` request.
    pub url: Url,
    /// Delay between background probes.
    pub interval: Duration,
    /// Per-probe timeout.
    pub timeout: Duration,
}

/// Network status derived from HTTP reachability of the API host.
///
/// Any HTTP response, whatever its status, means the host is reachable.
/// Connection failures and timeouts mean offline. Watching starts a
/// background poll loop, which stops when the probe is dropped.
pub struct HttpProbe {
    config: ProbeConfig,
    client: reqwest::Client,
    tx: Arc<watch::Sender<NetworkState>>,
    poller: Mutex<Option<CancellationToken>>,
}

impl HttpProbe {
    pub fn new(config: ProbeConfig) -> NetworkResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NetworkError::Probe(e.to_string()))?;
        let (tx, _rx) = watch::channel(NetworkState::offline());
        Ok(HttpProbe {
            config,
            client,
            tx: Arc::new(tx),
            poller: Mutex::new(None),
        })
    }

    fn start_polling(&self) {
        let mut poller = self.poller.lock().unwrap_or_else(|e| e.into_inner());
        if poller.is_some() {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("no async runtime, network probe will not poll");
            return;
        };

        let token = CancellationToken::new();
        let task_token = token.clone();
        let client = self.client.clone();
        let url = self.config.url.clone();
        let interval = self.config.interval;
        let tx = Arc::clone(&self.tx);

        handle.spawn(async move {
            loop {
                let state = probe(&client, &url).await;
                tx.send_if_modified(|current| {
                    let changed = *current != state;
                    *current = state;
                    changed
                });
                tokio::select! {
                    _ = task_token.cancelled() => return,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
        });
        *poller = Some(token);
    }
}

impl Drop for HttpProbe {
    fn drop(&mut self) {
        if let Some(token) = self
            .poller
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            token.cancel();
        }
    }
}

impl NetworkStatus for HttpProbe {
    fn fetch(&self) -> BoxFuture<'_, NetworkResult<NetworkState>> {
        Box::pin(async move {
            let state = probe(&self.client, &self.config.url).await;
            self.tx.send_replace(state);
            Ok(state)
        })
    }

    fn watch(&self) -> watch::Receiver<NetworkState> {
        self.start_polling();
        self.tx.subscribe()
    }
}

async fn probe(client: &reqwest::Client, url: &Url) -> NetworkState {
    match client.head(url.clone()).send().await {
        Ok(_) => NetworkState::online(),
        Err(e) => {
            tracing::debug!(url = %url, error = %e, "network probe failed");
            NetworkState::offline()
        }
    }
}
