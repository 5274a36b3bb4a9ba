// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Encrypted offline queue for deferred mutations.
//!
//! The whole queue is one JSON array, encrypted and stored as a single string
//! under [`QUEUE_STORAGE_KEY`]. Every mutation reads the full list, changes it
//! in memory and writes the full list back. An empty queue is never written;
//! the key is removed instead.
//!
//! Stored value forms:
//!
//! | value        | meaning                                       |
//! |--------------|-----------------------------------------------|
//! | absent       | empty queue                                   |
//! | string       | ciphertext of the JSON array                  |
//! | array        | legacy plaintext, re-encrypted on first read  |
//! | anything else| treated as empty                              |
//!
//! Nothing here returns an error to the caller. Storage and crypto failures
//! are reported and degrade to an empty list or `false`. Data that cannot be
//! decrypted or parsed is discarded as a whole.

use std::sync::Arc;

use ob_core::report::SCOPE_QUEUE;
use ob_core::{
    Cipher, Error, ErrorReporter, KvStore, QueuedRequest, ReportContext, RequestSpec, Result,
    StoreLock,
};
use serde_json::Value;
use tokio::sync::{Mutex, MutexGuard};

/// Storage key holding the encrypted queue.
pub const QUEUE_STORAGE_KEY: &str = "offline_queue";

/// Persistent, encrypted FIFO of deferred requests.
pub struct OfflineQueue {
    storage: Arc<dyn KvStore>,
    cipher: Arc<dyn Cipher>,
    reporter: Arc<dyn ErrorReporter>,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

/// What a read of the queue key found.
enum Stored {
    Entries(Vec<QueuedRequest>),
    /// Plaintext array from an older client, still to be encrypted.
    Legacy(Vec<QueuedRequest>),
    Unreadable(Error, &'static str),
}

/// Both locks that must be held to write the queue key.
struct WriteGuard<'a> {
    _local: MutexGuard<'a, ()>,
    _store: StoreLock,
}

impl OfflineQueue {
    pub fn new(
        storage: Arc<dyn KvStore>,
        cipher: Arc<dyn Cipher>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        OfflineQueue {
            storage,
            cipher,
            reporter,
            write_lock: Mutex::new(()),
        }
    }

    /// Returns every queued entry, oldest first.
    ///
    /// Never fails: a storage read error is reported and yields `[]`.
    pub async fn get_queue(&self) -> Vec<QueuedRequest> {
        match self.snapshot().await {
            Ok(entries) => entries,
            Err(e) => {
                self.report(&e, "getQueue");
                Vec::new()
            }
        }
    }

    /// Reads the queue, surfacing storage read and lock failures.
    ///
    /// A clean read takes no lock. Legacy migration and corruption handling
    /// rewrite the key, so they re-read it under the write locks and act on
    /// what is stored by then.
    pub async fn snapshot(&self) -> Result<Vec<QueuedRequest>> {
        if let Stored::Entries(entries) = self.read_stored().await? {
            return Ok(entries);
        }
        let _guard = self.lock().await?;
        self.load_locked().await
    }

    /// Appends a request, returning the stored entry.
    pub async fn enqueue(&self, spec: RequestSpec) -> Option<QueuedRequest> {
        let result = async {
            let _guard = self.lock().await?;
            let mut entries = self.load_locked().await?;
            let entry = QueuedRequest::new(spec);
            entries.push(entry.clone());
            self.persist(&entries).await?;
            Ok::<_, Error>(entry)
        }
        .await;

        match result {
            Ok(entry) => {
                tracing::debug!(id = %entry.id, method = %entry.method, url = %entry.url, "queued request");
                Some(entry)
            }
            Err(e) => {
                self.report(&e, "addToQueue");
                None
            }
        }
    }

    /// Appends a request. Returns `false` if it could not be persisted.
    pub async fn add_to_queue(&self, spec: RequestSpec) -> bool {
        self.enqueue(spec).await.is_some()
    }

    /// Removes the entry with the given id. Removing an unknown id succeeds.
    pub async fn remove_from_queue(&self, id: &str) -> bool {
        let result = async {
            let _guard = self.lock().await?;
            let entries = self.load_locked().await?;
            let before = entries.len();
            let remaining: Vec<QueuedRequest> =
                entries.into_iter().filter(|entry| entry.id != id).collect();
            if remaining.len() != before {
                self.persist(&remaining).await?;
            }
            Ok::<_, Error>(())
        }
        .await;

        match result {
            Ok(()) => true,
            Err(e) => {
                self.report(&e, "removeFromQueue");
                false
            }
        }
    }

    /// Deletes the whole queue.
    pub async fn clear_queue(&self) -> bool {
        let result = async {
            let _guard = self.lock().await?;
            self.storage.remove(QUEUE_STORAGE_KEY).await
        }
        .await;

        match result {
            Ok(()) => true,
            Err(e) => {
                self.report(&e, "clearQueue");
                false
            }
        }
    }

    /// Number of queued entries.
    pub async fn len(&self) -> usize {
        self.get_queue().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn lock(&self) -> Result<WriteGuard<'_>> {
        let local = self.write_lock.lock().await;
        let store = self.storage.lock(QUEUE_STORAGE_KEY).await?;
        Ok(WriteGuard {
            _local: local,
            _store: store,
        })
    }

    /// Reads and classifies the stored value without writing anything.
    async fn read_stored(&self) -> Result<Stored> {
        let stored = match self.storage.get(QUEUE_STORAGE_KEY).await {
            Ok(stored) => stored,
            Err(e @ Error::CorruptedData(_)) => return Ok(Stored::Unreadable(e, "getQueue")),
            Err(e) => return Err(e),
        };

        Ok(match stored {
            None => Stored::Entries(Vec::new()),
            Some(Value::String(ciphertext)) => match self.decode(&ciphertext).await {
                Ok(entries) => Stored::Entries(entries),
                Err(e) => Stored::Unreadable(e, "getQueue"),
            },
            Some(legacy @ Value::Array(_)) => {
                match serde_json::from_value::<Vec<QueuedRequest>>(legacy) {
                    Ok(entries) => Stored::Legacy(entries),
                    Err(e) => Stored::Unreadable(e.into(), "migrateLegacyQueue"),
                }
            }
            Some(_) => Stored::Entries(Vec::new()),
        })
    }

    /// Reads the queue, migrating or discarding what needs it.
    ///
    /// Caller holds the write locks.
    async fn load_locked(&self) -> Result<Vec<QueuedRequest>> {
        match self.read_stored().await? {
            Stored::Entries(entries) => Ok(entries),
            Stored::Legacy(entries) => Ok(self.migrate_legacy(entries).await),
            Stored::Unreadable(e, op) => {
                self.report(&e, op);
                self.discard().await;
                Ok(Vec::new())
            }
        }
    }

    async fn persist(&self, entries: &[QueuedRequest]) -> Result<()> {
        if entries.is_empty() {
            return self.storage.remove(QUEUE_STORAGE_KEY).await;
        }
        let json = serde_json::to_string(entries)?;
        let ciphertext = self.cipher.encrypt(&json).await?;
        self.storage
            .set(QUEUE_STORAGE_KEY, Value::String(ciphertext))
            .await
    }

    async fn decode(&self, ciphertext: &str) -> Result<Vec<QueuedRequest>> {
        let plaintext = self.cipher.decrypt(ciphertext).await?;
        let value: Value = serde_json::from_str(&plaintext)?;
        if !value.is_array() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_value(value)?)
    }

    async fn migrate_legacy(&self, entries: Vec<QueuedRequest>) -> Vec<QueuedRequest> {
        match self.persist(&entries).await {
            Ok(()) => {
                tracing::info!(entries = entries.len(), "migrated legacy plaintext queue");
                entries
            }
            Err(e) => {
                self.report(&e, "migrateLegacyQueue");
                self.discard().await;
                Vec::new()
            }
        }
    }

    /// Drops whatever is stored under the queue key.
    async fn discard(&self) {
        tracing::warn!("discarding unreadable offline queue");
        if let Err(e) = self.storage.remove(QUEUE_STORAGE_KEY).await {
            self.report(&e, "discardQueue");
        }
    }

    fn report(&self, error: &Error, op: &'static str) {
        self.reporter
            .report(error, ReportContext::new(SCOPE_QUEUE, op));
    }
}
