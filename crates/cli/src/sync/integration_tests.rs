// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end tests wiring network, observer, gateway, queue and
//! orchestrator together.

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use ob_core::{ErrorReporter, MemoryStore, OutgoingRequest, QueuedRequest};
use serde_json::{json, Value};

use super::connectivity::ConnectivityObserver;
use super::gateway::RequestGateway;
use super::hydrate::hydrate;
use super::network::{ManualNetwork, NetworkStatus};
use super::orchestrator::{SyncOrchestrator, SyncOutcome};
use super::queue::{OfflineQueue, QUEUE_STORAGE_KEY};
use super::test_helpers::{make_queue, post_spec, test_contract, RecordingReporter};
use super::transport_tests::MockExecutor;

/// Everything a process would wire up at startup.
struct App {
    network: Arc<ManualNetwork>,
    observer: Arc<ConnectivityObserver>,
    queue: Arc<OfflineQueue>,
    gateway: RequestGateway,
    orchestrator: Arc<SyncOrchestrator>,
    executor: MockExecutor,
}

impl App {
    fn start(store: MemoryStore, online: bool) -> Self {
        let reporter = RecordingReporter::new();
        let network = Arc::new(ManualNetwork::new(online));
        let observer = Arc::new(ConnectivityObserver::new(
            Arc::clone(&network) as Arc<dyn NetworkStatus>,
            Arc::clone(&reporter) as Arc<dyn ErrorReporter>,
        ));
        let queue = make_queue(store, &reporter);
        let executor = MockExecutor::new();
        let gateway =
            RequestGateway::new(Arc::clone(&observer), test_contract(), Arc::clone(&queue));
        let orchestrator = Arc::new(SyncOrchestrator::new(
            Arc::clone(&observer),
            Arc::clone(&queue),
            Arc::new(executor.clone()),
            reporter as Arc<dyn ErrorReporter>,
        ));

        observer.start_listening();
        orchestrator.start_sync();

        App {
            network,
            observer,
            queue,
            gateway,
            orchestrator,
            executor,
        }
    }

    async fn settle_online(&self, online: bool) {
        for _ in 0..100 {
            if self.observer.is_online() == online {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("observer never reached online={online}");
    }

    async fn settle_queue_len(&self, len: usize) {
        for _ in 0..100 {
            if self.queue.len().await == len {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("queue never reached {len} entries");
    }
}

#[tokio::test]
async fn test_offline_writes_are_replayed_on_reconnect() {
    let app = App::start(MemoryStore::new(), false);
    app.settle_online(false).await;

    for n in 1..=3 {
        let request =
            OutgoingRequest::new("POST", "/api/v1/orders").with_body(json!({ "n": n }));
        assert!(app.gateway.queue_request_if_offline(&request).await.unwrap());
    }
    assert_eq!(app.queue.len().await, 3);
    assert!(app.executor.sent().is_empty());

    app.network.set_connected(true);
    app.settle_queue_len(0).await;

    let bodies: Vec<Option<Value>> = app.executor.sent().into_iter().map(|s| s.body).collect();
    assert_eq!(
        bodies,
        vec![Some(json!({"n": 1})), Some(json!({"n": 2})), Some(json!({"n": 3}))]
    );
}

#[tokio::test]
async fn test_failed_replay_keeps_only_failed_entry() {
    let app = App::start(MemoryStore::new(), false);
    app.settle_online(false).await;

    let first = OutgoingRequest::new("POST", "/api/v1/orders");
    let second = OutgoingRequest::new("POST", "/api/v1/notes");
    app.gateway.queue_request_if_offline(&first).await.unwrap();
    app.gateway.queue_request_if_offline(&second).await.unwrap();
    let queued = app.queue.get_queue().await;
    app.executor.fail_url("/api/v1/orders");

    app.network.set_connected(true);
    app.settle_queue_len(1).await;

    assert_eq!(app.queue.get_queue().await, vec![queued[0].clone()]);
}

#[tokio::test]
async fn test_legacy_queue_is_delivered_after_upgrade() {
    let store = MemoryStore::new();
    let legacy = vec![QueuedRequest::new(post_spec("/api/v1/orders"))];
    store.insert(QUEUE_STORAGE_KEY, serde_json::to_value(&legacy).unwrap());

    let app = App::start(store.clone(), false);
    assert_eq!(app.queue.get_queue().await, legacy);
    assert!(matches!(
        store.peek(QUEUE_STORAGE_KEY),
        Some(Value::String(_))
    ));
    assert_eq!(app.queue.get_queue().await, legacy);

    app.settle_online(false).await;
    app.network.set_connected(true);
    app.settle_queue_len(0).await;
    assert_eq!(app.executor.sent_urls(), vec!["/api/v1/orders"]);
}

#[tokio::test]
async fn test_reads_are_never_queued() {
    let app = App::start(MemoryStore::new(), false);
    app.settle_online(false).await;

    let request = OutgoingRequest::new("GET", "/api/v1/orders");
    assert!(!app.gateway.queue_request_if_offline(&request).await.unwrap());
    assert!(app.queue.is_empty().await);
}

#[tokio::test]
async fn test_corrupted_queue_is_dropped() {
    let store = MemoryStore::new();
    store.insert(QUEUE_STORAGE_KEY, Value::String("definitely not ciphertext".into()));

    let app = App::start(store.clone(), true);
    assert!(app.queue.get_queue().await.is_empty());
    assert!(store.peek(QUEUE_STORAGE_KEY).is_none());
}

#[tokio::test]
async fn test_queue_survives_process_restart() {
    let store = MemoryStore::new();
    {
        let app = App::start(store.clone(), false);
        app.settle_online(false).await;
        let request = OutgoingRequest::new("DELETE", "/api/v1/notes/5");
        assert!(app.gateway.queue_request_if_offline(&request).await.unwrap());
        app.orchestrator.stop_sync();
        app.observer.reset();
    }

    let app = App::start(store, false);
    let reporter = RecordingReporter::new();
    let hydration = hydrate(&app.queue, reporter.as_ref()).await;
    assert_eq!(hydration.pending(), 1);

    app.settle_online(false).await;
    app.network.set_connected(true);
    app.settle_queue_len(0).await;
    assert_eq!(app.executor.sent_urls(), vec!["/api/v1/notes/5"]);
}

#[tokio::test]
async fn test_manual_pass_after_flapping() {
    let app = App::start(MemoryStore::new(), false);
    app.settle_online(false).await;
    app.gateway
        .queue_request_if_offline(&OutgoingRequest::new("POST", "/api/v1/orders"))
        .await
        .unwrap();

    for _ in 0..5 {
        app.network.set_connected(true);
        app.network.set_connected(false);
    }
    app.network.set_connected(true);
    app.settle_online(true).await;
    app.settle_queue_len(0).await;

    assert!(matches!(
        app.orchestrator.process_queue().await,
        SyncOutcome::Completed { delivered: 0, .. } | SyncOutcome::AlreadyRunning
    ));
    assert!(!app.executor.sent().is_empty());
}
