// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity observer.
//!
//! Tracks whether the process is online and notifies subscribers when that
//! changes. Notifications are edge-triggered: a listener hears about a flip,
//! never about a repeated reading of the same state.
//!
//! The observer is an explicit service object with a lifecycle:
//!
//! ```text
//! new() ──► start_listening() ──► stop_listening()
//!   ▲                                   │
//!   └──────────── reset() ◄─────────────┘
//! ```

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

use ob_core::report::SCOPE_NETWORK;
use ob_core::{ErrorReporter, ReportContext};
use tokio_util::sync::CancellationToken;

use super::network::NetworkStatus;

/// State assumed before the first reading.
const INITIAL_ONLINE: bool = true;

/// Error type for failures inside subscriber callbacks.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("connectivity listener panicked: {0}")]
    Panicked(String),
}

type Listener = Arc<dyn Fn(bool) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Handle returned by [`ConnectivityObserver::subscribe`].
///
/// Dropping the handle keeps the listener registered; call
/// [`Subscription::unsubscribe`] to remove it.
pub struct Subscription {
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
}

impl Subscription {
    /// Removes the listener. Calling this more than once is harmless.
    pub fn unsubscribe(&self) {
        if let Some(listeners) = self.listeners.upgrade() {
            let mut listeners = listeners.lock().unwrap_or_else(|e| e.into_inner());
            listeners.entries.retain(|(id, _)| *id != self.id);
        }
    }
}

/// Teardown handle for the background listening task.
#[derive(Debug, Clone)]
pub struct ListenHandle {
    token: Arc<CancellationToken>,
}

impl ListenHandle {
    /// Stops the listening task.
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Returns true if both handles control the same listening task.
    pub fn same_as(&self, other: &ListenHandle) -> bool {
        Arc::ptr_eq(&self.token, &other.token)
    }
}

/// Tracks online/offline state and fans changes out to subscribers.
pub struct ConnectivityObserver {
    network: Arc<dyn NetworkStatus>,
    reporter: Arc<dyn ErrorReporter>,
    online: AtomicBool,
    listeners: Arc<Mutex<Listeners>>,
    listening: Mutex<Option<ListenHandle>>,
}

impl ConnectivityObserver {
    pub fn new(network: Arc<dyn NetworkStatus>, reporter: Arc<dyn ErrorReporter>) -> Self {
        ConnectivityObserver {
            network,
            reporter,
            online: AtomicBool::new(INITIAL_ONLINE),
            listeners: Arc::new(Mutex::new(Listeners::default())),
            listening: Mutex::new(None),
        }
    }

    /// Returns the last known state.
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Reads the network status afresh and updates the tracked state.
    ///
    /// A failed read is reported and treated as offline.
    pub async fn check_connectivity(&self) -> bool {
        let online = match self.network.fetch().await {
            Ok(state) => state.connected,
            Err(e) => {
                self.reporter
                    .report(&e, ReportContext::new(SCOPE_NETWORK, "checkConnectivity"));
                false
            }
        };
        self.set_online(online);
        online
    }

    /// Registers a listener called with the new state on every change.
    pub fn subscribe(&self, listener: impl Fn(bool) + Send + Sync + 'static) -> Subscription {
        let mut listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        listeners.next_id += 1;
        let id = listeners.next_id;
        listeners.entries.push((id, Arc::new(listener)));
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .len()
    }

    /// Records a new state, notifying listeners if it differs from the last.
    pub fn set_online(&self, online: bool) {
        let previous = self.online.swap(online, Ordering::SeqCst);
        if previous != online {
            tracing::info!(online, "connectivity changed");
            self.notify(online);
        }
    }

    fn notify(&self, online: bool) {
        // Listeners may subscribe or unsubscribe from inside the callback,
        // so call them outside the lock.
        let snapshot: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in snapshot {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| listener(online))) {
                let err = ListenerError::Panicked(panic_message(payload.as_ref()));
                self.reporter
                    .report(&err, ReportContext::new(SCOPE_NETWORK, "notifyListener"));
            }
        }
    }

    /// Attaches to the network's change events.
    ///
    /// Idempotent: while listening, further calls return the same handle.
    /// Must be called from within a tokio runtime; otherwise a stopped
    /// handle is returned and nothing is observed.
    pub fn start_listening(self: &Arc<Self>) -> ListenHandle {
        let mut listening = self.listening.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = listening.as_ref() {
            if !handle.is_stopped() {
                return handle.clone();
            }
        }

        let handle = ListenHandle {
            token: Arc::new(CancellationToken::new()),
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::error!("start_listening called outside an async runtime");
            handle.stop();
            return handle;
        };

        let mut rx = self.network.watch();
        let observer = Arc::downgrade(self);
        let token = CancellationToken::clone(&handle.token);
        runtime.spawn(async move {
            loop {
                let connected = rx.borrow_and_update().connected;
                match observer.upgrade() {
                    Some(observer) => observer.set_online(connected),
                    None => return,
                }
                tokio::select! {
                    biased;
                    _ = token.cancelled() => return,
                    changed = rx.changed() => {
                        if changed.is_err() {
                            return;
                        }
                    }
                }
            }
        });

        tracing::debug!("connectivity listening started");
        *listening = Some(handle.clone());
        handle
    }

    /// Detaches from the network's change events. Idempotent.
    pub fn stop_listening(&self) {
        let handle = self
            .listening
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            handle.stop();
            tracing::debug!("connectivity listening stopped");
        }
    }

    /// Returns true while a listening task is attached.
    pub fn is_listening(&self) -> bool {
        self.listening
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|handle| !handle.is_stopped())
    }

    /// Stops listening, drops every listener and restores the initial state.
    pub fn reset(&self) {
        self.stop_listening();
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .clear();
        self.online.store(INITIAL_ONLINE, Ordering::SeqCst);
    }
}

impl Drop for ConnectivityObserver {
    fn drop(&mut self) {
        self.stop_listening();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
