// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Key-value storage abstraction.
//!
//! Values are JSON documents. The offline queue stores a ciphertext string
//! under its key; older clients stored a raw JSON array, which is why the
//! value type is not simply a string.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::error::{Error, Result};
use crate::BoxFuture;

/// Asynchronous key-value storage. Every operation may fail.
pub trait KvStore: Send + Sync {
    /// Reads the value under `key`, or `None` if absent.
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Value>>>;

    /// Writes `value` under `key`, replacing any previous value.
    fn set<'a>(&'a self, key: &'a str, value: Value) -> BoxFuture<'a, Result<()>>;

    /// Removes `key`. Removing an absent key succeeds.
    fn remove<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<()>>;

    /// Takes an exclusive lock on `key`, held until the returned guard drops.
    ///
    /// Stores shared between processes must exclude the other processes here.
    /// The default suits stores that live inside a single process.
    fn lock<'a>(&'a self, _key: &'a str) -> BoxFuture<'a, Result<StoreLock>> {
        Box::pin(async { Ok(StoreLock::unlocked()) })
    }
}

/// Guard returned by [`KvStore::lock`]. Dropping it releases the lock.
#[must_use]
pub struct StoreLock {
    _held: Option<Box<dyn Send + Sync>>,
}

impl StoreLock {
    /// Wraps whatever keeps the lock alive, such as a locked file handle.
    pub fn new(held: impl Send + Sync + 'static) -> Self {
        StoreLock {
            _held: Some(Box::new(held)),
        }
    }

    /// Guard that holds nothing.
    pub fn unlocked() -> Self {
        StoreLock { _held: None }
    }
}

impl std::fmt::Debug for StoreLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreLock")
            .field("held", &self._held.is_some())
            .finish()
    }
}

/// In-memory store, shared between clones.
///
/// Clones see the same data, which lets a test drop a queue and reopen a new
/// one over the same storage to simulate a restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the raw value under `key`.
    pub fn peek(&self, key: &str) -> Option<Value> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    /// Writes a raw value directly, bypassing the async interface.
    pub fn insert(&self, key: &str, value: Value) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value);
        }
    }

    fn with_entries<T>(&self, f: impl FnOnce(&mut HashMap<String, Value>) -> T) -> Result<T> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| Error::Storage("memory store lock poisoned".to_string()))?;
        Ok(f(&mut entries))
    }
}

impl KvStore for MemoryStore {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Value>>> {
        Box::pin(async move { self.with_entries(|entries| entries.get(key).cloned()) })
    }

    fn set<'a>(&'a self, key: &'a str, value: Value) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.with_entries(|entries| {
                entries.insert(key.to_string(), value);
            })
        })
    }

    fn remove<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.with_entries(|entries| {
                entries.remove(key);
            })
        })
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
