//! Storage collaborator for the discovery cache
//!
//! The cache addresses its backend as a key → serialized-bytes map with
//! atomic single-key create/read/delete. Keys are exactly the canonical
//! strings produced by [`DiscoveryCacheKey`](super::DiscoveryCacheKey), so a
//! filesystem backend can use them as file names without further escaping.

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;

/// Backend I/O failures, surfaced to cache callers unmodified.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem I/O failure
    #[error("storage I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-specific failure
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Key → bytes storage consumed by [`DiscoveryCache`](super::DiscoveryCache).
///
/// `delete` must be idempotent: two concurrent reads of the same expired key
/// may both evict it, and the second delete of an already-absent key is not
/// an error.
#[async_trait]
pub trait CacheStorage: Send + Sync + fmt::Debug {
    /// Write `bytes` under `key`, replacing any existing entry.
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;

    /// Read the bytes stored under `key`, or `None` if absent.
    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Delete the entry under `key`. Absence is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Delete every entry in this storage's namespace.
    async fn clear_namespace(&self) -> Result<(), StorageError>;
}

/// In-memory storage backend over a concurrent map.
#[derive(Debug, Default)]
pub struct InMemoryCacheStorage {
    entries: DashMap<String, Vec<u8>>,
}

impl InMemoryCacheStorage {
    /// Create an empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for InMemoryCacheStorage {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.entries.get(key).map(|entry| entry.clone()))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn clear_namespace(&self) -> Result<(), StorageError> {
        self.entries.clear();
        Ok(())
    }
}

/// Filesystem storage backend: one file per canonical key under a
/// namespace directory.
#[derive(Debug)]
pub struct FilesystemCacheStorage {
    root: PathBuf,
}

impl FilesystemCacheStorage {
    /// Create a backend rooted at `root`. The directory is created lazily
    /// on the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl CacheStorage for FilesystemCacheStorage {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(key), bytes).await?;
        Ok(())
    }

    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match tokio::fs::read(self.root.join(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.root.join(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn clear_namespace(&self) -> Result<(), StorageError> {
        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = dir.next_entry().await? {
            if entry.file_type().await?.is_file() {
                tokio::fs::remove_file(entry.path()).await?;
            }
        }
        Ok(())
    }
}
