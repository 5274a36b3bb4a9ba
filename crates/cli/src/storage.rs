// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! File-backed key-value store.
//!
//! Each key is one JSON document at `<dir>/<key>.json`. Writes go to a
//! temporary sibling that is synced and then renamed over the target, so a
//! crash leaves either the old value or the new one.
//!
//! Several `outbox` processes may share one state directory, so
//! [`KvStore::lock`] takes an exclusive `fs2` lock on `<dir>/<key>.lock`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use ob_core::{BoxFuture, Error, KvStore, Result, StoreLock};
use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Key-value store persisting one file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }

    /// Path of the lock file guarding `key`.
    pub fn lock_path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.lock")))
    }

    async fn read(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key)?;
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| Error::CorruptedData(format!("{}: {e}", path.display())))
    }

    async fn write(&self, key: &str, value: Value) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).await?;

        let tmp = self.dir.join(temp_name(key));
        let bytes = serde_json::to_vec(&value)?;
        let mut file = fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&tmp, &path).await?;
        tracing::trace!(path = %path.display(), "stored value");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn lock_key(&self, key: &str) -> Result<StoreLock> {
        let path = self.lock_path_for(key)?;
        fs::create_dir_all(&self.dir).await?;
        let file = tokio::task::spawn_blocking(move || acquire_lock(&path))
            .await
            .map_err(|e| Error::Storage(format!("lock task failed: {e}")))??;
        Ok(StoreLock::new(file))
    }
}

impl KvStore for FileStore {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Value>>> {
        Box::pin(self.read(key))
    }

    fn set<'a>(&'a self, key: &'a str, value: Value) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.write(key, value))
    }

    fn remove<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.delete(key))
    }

    fn lock<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<StoreLock>> {
        Box::pin(self.lock_key(key))
    }
}

/// Blocks until the exclusive lock on `lock_path` is ours.
fn acquire_lock(lock_path: &Path) -> std::io::Result<std::fs::File> {
    use fs2::FileExt;

    let file = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)?;
    file.lock_exclusive()?;
    Ok(file)
}

/// Temp file name unique to this process and write.
fn temp_name(key: &str) -> String {
    static NEXT: AtomicU64 = AtomicU64::new(0);
    let n = NEXT.fetch_add(1, Ordering::Relaxed);
    format!(".{key}.{}.{n}.json.tmp", std::process::id())
}

/// Keys become file names, so they are limited to a safe alphabet.
fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(Error::Storage(format!("invalid storage key '{key}'")))
    }
}

#[cfg(test)]
#[path = "storage_tests.rs"]
mod tests;
