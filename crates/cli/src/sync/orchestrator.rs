// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Replays the offline queue when connectivity returns.
//!
//! Entries are sent one at a time, oldest first. A success removes the entry;
//! a failure is reported and the entry stays for the next pass. Delivery is
//! at-least-once: an entry whose removal fails after a successful send will
//! be sent again.
//!
//! Only one pass runs at a time. A pass requested while another is running
//! is folded into it: the running pass goes around once more, so entries
//! queued after its snapshot are not left behind.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use ob_core::report::SCOPE_SYNC;
use ob_core::{ErrorReporter, ReportContext};

use super::connectivity::{ConnectivityObserver, Subscription};
use super::queue::OfflineQueue;
use super::transport::ApiExecutor;

/// Result of a call to [`SyncOrchestrator::process_queue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Nothing attempted, the observer reports offline.
    Offline,
    /// Another pass was already running.
    AlreadyRunning,
    /// The pass went over the whole snapshot.
    Completed { delivered: usize, failed: usize },
}

/// Clears the running flag when the pass ends, however it ends.
struct PassGuard<'a>(&'a AtomicBool);

impl<'a> PassGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PassGuard(flag))
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives sync passes over the offline queue.
pub struct SyncOrchestrator {
    observer: Arc<ConnectivityObserver>,
    queue: Arc<OfflineQueue>,
    executor: Arc<dyn ApiExecutor>,
    reporter: Arc<dyn ErrorReporter>,
    pass_running: AtomicBool,
    rerun_requested: AtomicBool,
    subscription: Mutex<Option<Subscription>>,
}

impl SyncOrchestrator {
    pub fn new(
        observer: Arc<ConnectivityObserver>,
        queue: Arc<OfflineQueue>,
        executor: Arc<dyn ApiExecutor>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        SyncOrchestrator {
            observer,
            queue,
            executor,
            reporter,
            pass_running: AtomicBool::new(false),
            rerun_requested: AtomicBool::new(false),
            subscription: Mutex::new(None),
        }
    }

    /// Starts a pass in the background on every transition to online.
    ///
    /// Idempotent. Must be called from within a tokio runtime.
    pub fn start_sync(self: &Arc<Self>) {
        let mut subscription = self.subscription.lock().unwrap_or_else(|e| e.into_inner());
        if subscription.is_some() {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::error!("start_sync called outside an async runtime");
            return;
        };

        let orchestrator = Arc::downgrade(self);
        *subscription = Some(self.observer.subscribe(move |online| {
            if !online {
                return;
            }
            let Some(orchestrator) = orchestrator.upgrade() else {
                return;
            };
            runtime.spawn(async move {
                let outcome = orchestrator.process_queue().await;
                tracing::info!(?outcome, "reconnect sync pass finished");
            });
        }));
        tracing::debug!("sync started");
    }

    /// Stops reacting to connectivity changes. Idempotent.
    pub fn stop_sync(&self) {
        let subscription = self
            .subscription
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(subscription) = subscription {
            subscription.unsubscribe();
            tracing::debug!("sync stopped");
        }
    }

    pub fn is_started(&self) -> bool {
        self.subscription
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Replays the queue, then again while reruns were requested meanwhile.
    pub async fn process_queue(&self) -> SyncOutcome {
        if !self.observer.is_online() {
            return SyncOutcome::Offline;
        }
        let Some(mut pass) = self.acquire_or_request_rerun() else {
            tracing::debug!("sync pass already running, rerun requested");
            return SyncOutcome::AlreadyRunning;
        };

        let mut delivered = 0;
        let mut failed = 0;
        loop {
            self.rerun_requested.store(false, Ordering::SeqCst);
            let (ok, err) = self.replay_snapshot().await;
            delivered += ok;
            failed += err;
            drop(pass);

            if !self.rerun_requested.load(Ordering::SeqCst) || !self.observer.is_online() {
                break;
            }
            match PassGuard::acquire(&self.pass_running) {
                Some(next) => {
                    tracing::debug!("rerunning sync pass requested during the last one");
                    pass = next;
                }
                None => break,
            }
        }

        SyncOutcome::Completed { delivered, failed }
    }

    fn acquire_or_request_rerun(&self) -> Option<PassGuard<'_>> {
        if let Some(pass) = PassGuard::acquire(&self.pass_running) {
            return Some(pass);
        }
        self.rerun_requested.store(true, Ordering::SeqCst);
        // The running pass may have finished before it saw the request.
        PassGuard::acquire(&self.pass_running)
    }

    /// One pass over the current snapshot. Returns (delivered, failed).
    async fn replay_snapshot(&self) -> (usize, usize) {
        let entries = self.queue.get_queue().await;
        let mut delivered = 0;
        let mut failed = 0;

        for entry in entries {
            match self.executor.execute(&entry.spec()).await {
                Ok(response) => {
                    tracing::debug!(id = %entry.id, status = response.status, "delivered queued request");
                    if !self.queue.remove_from_queue(&entry.id).await {
                        tracing::warn!(id = %entry.id, "delivered request could not be removed, it will be sent again");
                    }
                    delivered += 1;
                }
                Err(e) => {
                    self.reporter.report(
                        &e,
                        ReportContext::new(SCOPE_SYNC, "processQueueItem").with_id(&entry.id),
                    );
                    failed += 1;
                }
            }
        }

        (delivered, failed)
    }
}
