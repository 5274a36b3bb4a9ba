// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline queueing and reconnect sync.
//!
//! Writes issued while offline are deferred into an encrypted queue and
//! replayed when connectivity returns.
//!
//! # Architecture
//!
//! ```text
//!   caller ──► ┌─────────────┐  offline   ┌──────────────┐
//!              │   Gateway   │───────────►│    Queue     │ (encrypted,
//!              └─────────────┘            │(OfflineQueue)│  persisted)
//!                     │                   └──────────────┘
//!                     ▼                          ▲
//!              ┌─────────────┐  online    ┌──────────────┐     ┌──────────┐
//!              │  Observer   │───────────►│ Orchestrator │────►│ Executor │
//!              └─────────────┘            └──────────────┘     │ (trait)  │
//!                     ▲                                        └──────────┘
//!              ┌─────────────┐
//!              │   Network   │ (trait)
//!              └─────────────┘
//! ```
//!
//! # Features
//!
//! - Eligibility check against the mounted routes before anything is queued
//! - Encrypted-at-rest queue surviving restarts, with legacy plaintext migration
//! - Edge-triggered connectivity notifications with per-listener isolation
//! - Sequential replay on reconnect, one request in flight at a time
//! - Injectable network, storage, cipher and executor traits for testing

mod connectivity;
mod gateway;
mod hydrate;
mod network;
mod orchestrator;
mod queue;
mod transport;

pub use connectivity::{ConnectivityObserver, ListenHandle, ListenerError, Subscription};
pub use gateway::{GatewayError, RequestGateway};
pub use hydrate::{hydrate, Hydration};
pub use network::{
    HttpProbe, ManualNetwork, NetworkError, NetworkResult, NetworkState, NetworkStatus,
    ProbeConfig,
};
pub use orchestrator::{SyncOrchestrator, SyncOutcome};
pub use queue::{OfflineQueue, QUEUE_STORAGE_KEY};
pub use transport::{ApiExecutor, ApiResponse, ExecError, ExecResult, HttpExecutor};

#[cfg(test)]
mod test_helpers;




#[cfg(test)]
mod integration_tests;




#[cfg(test)]
mod transport_tests;
