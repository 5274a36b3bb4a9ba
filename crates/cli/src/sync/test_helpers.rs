// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]

use std::error::Error as StdError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ob_core::{
    BoxFuture, ChaChaCipher, Cipher, EligibilityContract, Error, ErrorReporter, KvStore,
    MemoryStore, OutgoingRequest, ReportContext, RequestSpec, Result, RouteManifest,
};
use serde_json::Value;

use super::queue::OfflineQueue;

/// Reporter that keeps every report for later assertions.
#[derive(Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<(String, ReportContext)>>,
}

impl RecordingReporter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reports(&self) -> Vec<(String, ReportContext)> {
        self.reports.lock().unwrap().clone()
    }

    pub fn contexts(&self) -> Vec<ReportContext> {
        self.reports().into_iter().map(|(_, ctx)| ctx).collect()
    }

    pub fn has(&self, scope: &str, op: &str) -> bool {
        self.contexts()
            .iter()
            .any(|ctx| ctx.scope == scope && ctx.op == op)
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, error: &(dyn StdError + 'static), context: ReportContext) {
        self.reports
            .lock()
            .unwrap()
            .push((error.to_string(), context));
    }
}

/// Memory store whose operations can be made to fail on demand.
#[derive(Clone, Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_get: Arc<AtomicBool>,
    pub fail_set: Arc<AtomicBool>,
    pub fail_remove: Arc<AtomicBool>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn over(inner: MemoryStore) -> Self {
        FlakyStore {
            inner,
            ..Default::default()
        }
    }

    fn check(flag: &AtomicBool, what: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            Err(Error::Storage(format!("{what} rejected")))
        } else {
            Ok(())
        }
    }
}

impl KvStore for FlakyStore {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Value>>> {
        Box::pin(async move {
            Self::check(&self.fail_get, "get")?;
            self.inner.get(key).await
        })
    }

    fn set<'a>(&'a self, key: &'a str, value: Value) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            Self::check(&self.fail_set, "set")?;
            self.inner.set(key, value).await
        })
    }

    fn remove<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            Self::check(&self.fail_remove, "remove")?;
            self.inner.remove(key).await
        })
    }
}

/// Cipher wrapper whose operations can be made to fail on demand.
#[derive(Clone)]
pub struct FlakyCipher {
    pub inner: ChaChaCipher,
    pub fail_encrypt: Arc<AtomicBool>,
    pub fail_decrypt: Arc<AtomicBool>,
    /// Delay applied once, to the next decrypt only.
    pub decrypt_delay: Arc<Mutex<Option<Duration>>>,
}

impl FlakyCipher {
    pub fn new() -> Self {
        FlakyCipher {
            inner: test_cipher(),
            fail_encrypt: Arc::new(AtomicBool::new(false)),
            fail_decrypt: Arc::new(AtomicBool::new(false)),
            decrypt_delay: Arc::new(Mutex::new(None)),
        }
    }

    /// Makes the next decrypt wait `delay` before doing any work.
    pub fn slow_next_decrypt(&self, delay: Duration) {
        *self.decrypt_delay.lock().unwrap() = Some(delay);
    }
}

impl Cipher for FlakyCipher {
    fn encrypt<'a>(&'a self, plaintext: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            if self.fail_encrypt.load(Ordering::SeqCst) {
                return Err(Error::Crypto("encrypt rejected".into()));
            }
            self.inner.encrypt(plaintext).await
        })
    }

    fn decrypt<'a>(&'a self, ciphertext: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let delay = self.decrypt_delay.lock().unwrap().take();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_decrypt.load(Ordering::SeqCst) {
                return Err(Error::Crypto("decrypt rejected".into()));
            }
            self.inner.decrypt(ciphertext).await
        })
    }
}

/// Fixed-key cipher so separate queue instances can read each other's data.
pub fn test_cipher() -> ChaChaCipher {
    ChaChaCipher::new(&[42u8; 32]).unwrap()
}

/// Queue over the given store with the fixed test cipher.
pub fn make_queue(
    store: impl KvStore + 'static,
    reporter: &Arc<RecordingReporter>,
) -> Arc<OfflineQueue> {
    Arc::new(OfflineQueue::new(
        Arc::new(store),
        Arc::new(test_cipher()),
        Arc::clone(reporter) as Arc<dyn ErrorReporter>,
    ))
}

/// Contract mounting `orders` and `notes` under `/api/v1`.
pub fn test_contract() -> Arc<EligibilityContract> {
    let manifest = RouteManifest::default()
        .route("POST", "/api/v1/orders")
        .route("PATCH", "/api/v1/orders/{id}")
        .route("POST", "/api/v1/notes")
        .route("DELETE", "/api/v1/notes/{id}");
    Arc::new(EligibilityContract::new("https://api.example.com", "/api/v1", &manifest).unwrap())
}

/// Sanitized POST to `url`.
pub fn post_spec(url: &str) -> RequestSpec {
    ob_core::sanitize(&OutgoingRequest::new("POST", url)).unwrap()
}
