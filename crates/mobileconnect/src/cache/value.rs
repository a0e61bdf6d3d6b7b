//! Cached discovery payloads
//!
//! [`DiscoveryCacheValue`] is the envelope handed to the cache by callers.
//! It may transiently carry the subscriber identifier returned by the
//! discovery service, but that field exists only in memory: the form that
//! reaches the storage collaborator is the separate [`StoredEntry`] type,
//! which structurally has no subscriber field at all.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A value to be cached, as received from an in-flight discovery response.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryCacheValue {
    ttl: DateTime<Utc>,
    value: Value,
    subscriber_id: Option<String>,
}

impl DiscoveryCacheValue {
    /// Create a cache value with no subscriber identifier attached.
    pub fn new(ttl: DateTime<Utc>, value: Value) -> Self {
        Self {
            ttl,
            value,
            subscriber_id: None,
        }
    }

    /// Attach the transient subscriber identifier (encrypted MSISDN).
    ///
    /// The identifier travels with the in-memory value only; it is scrubbed
    /// before anything is persisted.
    pub fn with_subscriber_id(mut self, subscriber_id: impl Into<String>) -> Self {
        self.subscriber_id = Some(subscriber_id.into());
        self
    }

    /// Absolute expiry timestamp.
    pub fn ttl(&self) -> DateTime<Utc> {
        self.ttl
    }

    /// The cached discovery payload.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The transient subscriber identifier, if one was attached.
    pub fn subscriber_id(&self) -> Option<&str> {
        self.subscriber_id.as_deref()
    }

    /// Whether the current time is strictly after the ttl.
    pub fn has_expired(&self) -> bool {
        Utc::now() > self.ttl
    }
}

/// The persisted form of a cache entry: ttl and payload, nothing else.
///
/// This type is what actually gets serialized to the storage collaborator.
/// Keeping it distinct from [`DiscoveryCacheValue`] makes it impossible to
/// persist a subscriber identifier by accident.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredEntry {
    ttl: DateTime<Utc>,
    value: Value,
}

impl StoredEntry {
    pub(crate) fn scrubbed_from(value: &DiscoveryCacheValue) -> Self {
        Self {
            ttl: value.ttl(),
            value: value.value().clone(),
        }
    }

    pub(crate) fn has_expired(&self) -> bool {
        Utc::now() > self.ttl
    }

    pub(crate) fn into_value(self) -> DiscoveryCacheValue {
        DiscoveryCacheValue::new(self.ttl, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn test_expiry_rule() {
        let fresh = DiscoveryCacheValue::new(Utc::now() + Duration::hours(1), json!({}));
        assert!(!fresh.has_expired());

        let stale = DiscoveryCacheValue::new(Utc::now() - Duration::seconds(1), json!({}));
        assert!(stale.has_expired());
    }

    #[test]
    fn test_stored_entry_drops_subscriber_id() {
        let value = DiscoveryCacheValue::new(Utc::now(), json!({"serviceId": 12345}))
            .with_subscriber_id("447700900000");

        let entry = StoredEntry::scrubbed_from(&value);
        let bytes = serde_json::to_vec(&entry).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(!text.contains("447700900000"));

        let rebuilt = entry.into_value();
        assert_eq!(rebuilt.subscriber_id(), None);
        assert_eq!(rebuilt.ttl(), value.ttl());
        assert_eq!(rebuilt.value(), value.value());
    }

    #[test]
    fn test_stored_entry_round_trips_ttl_and_payload() {
        let ttl = Utc::now() + Duration::hours(2);
        let entry = StoredEntry::scrubbed_from(&DiscoveryCacheValue::new(
            ttl,
            json!({"test": true, "serviceId": 12345}),
        ));

        let bytes = serde_json::to_vec(&entry).unwrap();
        let decoded: StoredEntry = serde_json::from_slice(&bytes).unwrap();
        let value = decoded.into_value();
        assert_eq!(value.ttl(), ttl);
        assert_eq!(value.value(), &json!({"test": true, "serviceId": 12345}));
    }
}
