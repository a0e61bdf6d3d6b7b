//! # Discovery Result Cache
//!
//! Per-operator caching of discovery responses, keyed by carrier
//! identifiers with a time-to-live.
//!
//! ## Invariants
//!
//! - **Scrubbing**: a value handed to the storage collaborator never
//!   contains the subscriber identifier. The persisted type structurally
//!   has no such field; see [`DiscoveryCacheValue`].
//! - **Lazy eviction**: reading an expired entry deletes it from storage
//!   (an explicit, idempotent delete) and reports "no value".
//!
//! ## Error taxonomy
//!
//! [`CacheError::InvalidArgument`] signals caller programming error (a
//! required key or value was absent) and is distinct from
//! [`CacheError::Storage`], which carries the backend's I/O failure
//! unmodified. Neither is retried internally.

mod key;
mod storage;
mod value;

pub use key::DiscoveryCacheKey;
pub use storage::{CacheStorage, FilesystemCacheStorage, InMemoryCacheStorage, StorageError};
pub use value::DiscoveryCacheValue;

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use value::StoredEntry;

/// Discovery cache errors
#[derive(Debug, Error)]
pub enum CacheError {
    /// A required argument was absent at the call boundary
    #[error("{0} cannot be absent")]
    InvalidArgument(&'static str),

    /// Underlying storage I/O failure
    #[error("cache storage failure: {0}")]
    Storage(#[from] StorageError),

    /// A cache entry could not be serialized or deserialized
    #[error("cache entry codec failure: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Cache of discovery responses over a pluggable storage collaborator.
///
/// The cache adds no locking of its own; it assumes the storage provides
/// atomic single-key create/read/delete.
#[derive(Debug, Clone)]
pub struct DiscoveryCache {
    storage: Arc<dyn CacheStorage>,
}

impl DiscoveryCache {
    /// Create a cache over the given storage backend.
    pub fn new(storage: Arc<dyn CacheStorage>) -> Self {
        Self { storage }
    }

    /// Add a value to the cache under the given key.
    ///
    /// The persisted copy is rebuilt without the subscriber identifier
    /// before it is serialized; the in-memory `value` is left untouched.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidArgument`] if `key` or `value` is absent,
    /// [`CacheError::Storage`] if the backend write fails.
    pub async fn add(
        &self,
        key: Option<&DiscoveryCacheKey>,
        value: Option<&DiscoveryCacheValue>,
    ) -> Result<(), CacheError> {
        let key = key.ok_or(CacheError::InvalidArgument("key"))?;
        let value = value.ok_or(CacheError::InvalidArgument("value"))?;

        let entry = StoredEntry::scrubbed_from(value);
        let bytes = serde_json::to_vec(&entry)?;
        let canonical = key.canonical_string();
        self.storage.put(&canonical, &bytes).await?;

        debug!(key = %canonical, ttl = %value.ttl(), "cached discovery response");
        Ok(())
    }

    /// Return the cached value for `key`, if present and not expired.
    ///
    /// An expired entry is evicted from storage before "no value" is
    /// returned. The returned value is a fresh copy rebuilt from the stored
    /// ttl and payload; it never carries a subscriber identifier.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidArgument`] if `key` is absent,
    /// [`CacheError::Storage`] if the backend read or eviction fails.
    pub async fn get(
        &self,
        key: Option<&DiscoveryCacheKey>,
    ) -> Result<Option<DiscoveryCacheValue>, CacheError> {
        let key = key.ok_or(CacheError::InvalidArgument("key"))?;
        let canonical = key.canonical_string();

        let Some(bytes) = self.storage.get_raw(&canonical).await? else {
            return Ok(None);
        };
        let entry: StoredEntry = serde_json::from_slice(&bytes)?;

        if entry.has_expired() {
            debug!(key = %canonical, "evicting expired discovery response");
            self.storage.delete(&canonical).await?;
            return Ok(None);
        }

        Ok(Some(entry.into_value()))
    }

    /// Remove the entry for `key`. Absence is not an error.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidArgument`] if `key` is absent,
    /// [`CacheError::Storage`] if the backend delete fails.
    pub async fn remove(&self, key: Option<&DiscoveryCacheKey>) -> Result<(), CacheError> {
        let key = key.ok_or(CacheError::InvalidArgument("key"))?;
        self.storage.delete(&key.canonical_string()).await?;
        Ok(())
    }

    /// Delete every entry in the cache's namespace.
    ///
    /// # Errors
    ///
    /// [`CacheError::Storage`] if the backend fails.
    pub async fn clear(&self) -> Result<(), CacheError> {
        self.storage.clear_namespace().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn cache_and_storage() -> (DiscoveryCache, Arc<InMemoryCacheStorage>) {
        let storage = Arc::new(InMemoryCacheStorage::new());
        (DiscoveryCache::new(storage.clone()), storage)
    }

    #[tokio::test]
    async fn test_absent_key_or_value_is_invalid_argument() {
        let (cache, _) = cache_and_storage();
        let key = DiscoveryCacheKey::from_details(Some("234"), Some("15"));
        let value = DiscoveryCacheValue::new(Utc::now(), json!({}));

        assert!(matches!(
            cache.add(None, Some(&value)).await,
            Err(CacheError::InvalidArgument("key"))
        ));
        assert!(matches!(
            cache.add(key.as_ref(), None).await,
            Err(CacheError::InvalidArgument("value"))
        ));
        assert!(matches!(
            cache.get(None).await,
            Err(CacheError::InvalidArgument("key"))
        ));
        assert!(matches!(
            cache.remove(None).await,
            Err(CacheError::InvalidArgument("key"))
        ));
    }

    #[tokio::test]
    async fn test_add_then_get_scrubs_subscriber_id() {
        let (cache, _) = cache_and_storage();
        let key = DiscoveryCacheKey::from_details(Some("234"), Some("15")).unwrap();
        let value = DiscoveryCacheValue::new(
            Utc::now() + Duration::hours(1),
            json!({"serviceId": 12345}),
        )
        .with_subscriber_id("447700900000");

        cache.add(Some(&key), Some(&value)).await.unwrap();
        let cached = cache.get(Some(&key)).await.unwrap().unwrap();

        assert_eq!(cached.subscriber_id(), None);
        assert_eq!(cached.ttl(), value.ttl());
        assert_eq!(cached.value(), value.value());
        // The in-memory original still carries it.
        assert_eq!(value.subscriber_id(), Some("447700900000"));
    }

    #[tokio::test]
    async fn test_expired_entry_is_evicted_from_storage() {
        let (cache, storage) = cache_and_storage();
        let key = DiscoveryCacheKey::from_details(Some("234"), Some("15")).unwrap();
        let stale = DiscoveryCacheValue::new(Utc::now() - Duration::days(1), json!({"old": true}));

        cache.add(Some(&key), Some(&stale)).await.unwrap();
        assert!(cache.get(Some(&key)).await.unwrap().is_none());

        // Eviction actually reached the backend.
        let probe = storage.get_raw(&key.canonical_string()).await.unwrap();
        assert!(probe.is_none());
    }

    #[tokio::test]
    async fn test_remove_absent_key_is_noop_and_clear_empties() {
        let (cache, _) = cache_and_storage();
        let key = DiscoveryCacheKey::from_details(Some("234"), Some("15")).unwrap();
        cache.remove(Some(&key)).await.unwrap();

        let value = DiscoveryCacheValue::new(Utc::now() + Duration::hours(1), json!({}));
        cache.add(Some(&key), Some(&value)).await.unwrap();
        cache.clear().await.unwrap();
        assert!(cache.get(Some(&key)).await.unwrap().is_none());
    }
}
