// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod clear;
pub mod list;
pub mod routes;
pub mod send;
pub mod status;
pub mod sync;
pub mod watch;

use std::path::Path;
use std::sync::Arc;

use ob_core::{ChaChaCipher, Cipher, ErrorReporter, TracingReporter};

use crate::config::{self, Config};
use crate::error::Result;
use crate::storage::FileStore;
use crate::sync::{
    hydrate, ApiExecutor, ConnectivityObserver, HttpExecutor, HttpProbe, Hydration,
    ManualNetwork, NetworkStatus, OfflineQueue, RequestGateway, SyncOrchestrator,
};

/// Everything a command needs, wired once per process.
pub struct Context {
    pub config: Config,
    pub observer: Arc<ConnectivityObserver>,
    pub queue: Arc<OfflineQueue>,
    pub gateway: RequestGateway,
    pub executor: Arc<HttpExecutor>,
    pub orchestrator: Arc<SyncOrchestrator>,
    /// Queue contents read at startup.
    pub hydration: Hydration,
}

impl Context {
    /// Opens the queue in `state_dir` and reads the current connectivity.
    ///
    /// With `offline`, the network is pinned to unreachable and never probed.
    pub async fn open(config: Config, state_dir: &Path, offline: bool) -> Result<Self> {
        let network: Arc<dyn NetworkStatus> = if offline {
            Arc::new(ManualNetwork::new(false))
        } else {
            Arc::new(HttpProbe::new(config.probe_config()?)?)
        };
        let cipher = config::queue_cipher(state_dir)?;
        Self::open_with(config, state_dir, network, cipher).await
    }

    pub(crate) async fn open_with(
        config: Config,
        state_dir: &Path,
        network: Arc<dyn NetworkStatus>,
        cipher: ChaChaCipher,
    ) -> Result<Self> {
        let reporter: Arc<dyn ErrorReporter> = Arc::new(TracingReporter);

        let observer = Arc::new(ConnectivityObserver::new(network, Arc::clone(&reporter)));
        observer.check_connectivity().await;

        let queue = Arc::new(OfflineQueue::new(
            Arc::new(FileStore::new(state_dir)),
            Arc::new(cipher) as Arc<dyn Cipher>,
            Arc::clone(&reporter),
        ));
        let hydration = hydrate(&queue, reporter.as_ref()).await;

        let gateway = RequestGateway::new(
            Arc::clone(&observer),
            Arc::new(config.contract()?),
            Arc::clone(&queue),
        );
        let executor = Arc::new(HttpExecutor::new(
            config.base_url()?,
            config.default_timeout(),
        )?);
        let orchestrator = Arc::new(SyncOrchestrator::new(
            Arc::clone(&observer),
            Arc::clone(&queue),
            Arc::clone(&executor) as Arc<dyn ApiExecutor>,
            reporter,
        ));

        Ok(Context {
            config,
            observer,
            queue,
            gateway,
            executor,
            orchestrator,
            hydration,
        })
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
