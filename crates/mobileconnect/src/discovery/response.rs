//! Discovery response value object

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The operator-specific endpoint and credential bundle returned by a
/// discovery service call, or reconstructed from the cache.
///
/// Immutable once constructed: it is discarded when expired or explicitly
/// cleared, never mutated. Every network-touching flow phase re-validates
/// freshness with [`has_expired`](Self::has_expired) before acting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryResponse {
    cached: bool,
    ttl: DateTime<Utc>,
    response_code: u16,
    headers: HashMap<String, Vec<String>>,
    response_data: Value,
}

impl DiscoveryResponse {
    /// Create a discovery response.
    pub fn new(
        cached: bool,
        ttl: DateTime<Utc>,
        response_code: u16,
        headers: HashMap<String, Vec<String>>,
        response_data: Value,
    ) -> Self {
        Self {
            cached,
            ttl,
            response_code,
            headers,
            response_data,
        }
    }

    /// Whether this response came from the cache rather than the network.
    pub fn is_cached(&self) -> bool {
        self.cached
    }

    /// Absolute expiry timestamp.
    pub fn ttl(&self) -> DateTime<Utc> {
        self.ttl
    }

    /// HTTP status code of the discovery call.
    pub fn response_code(&self) -> u16 {
        self.response_code
    }

    /// Response headers, name to ordered values.
    pub fn headers(&self) -> &HashMap<String, Vec<String>> {
        &self.headers
    }

    /// The discovery payload.
    pub fn response_data(&self) -> &Value {
        &self.response_data
    }

    /// Whether the current time is strictly after the ttl.
    pub fn has_expired(&self) -> bool {
        Utc::now() > self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn test_accessors_and_expiry() {
        let ttl = Utc::now() - Duration::days(1);
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), vec!["application/json".into()]);
        let data = json!({"test": true, "serviceId": 12345});

        let response = DiscoveryResponse::new(true, ttl, 30, headers.clone(), data.clone());

        assert!(response.is_cached());
        assert_eq!(response.ttl(), ttl);
        assert_eq!(response.response_code(), 30);
        assert_eq!(response.headers(), &headers);
        assert_eq!(response.response_data(), &data);
        assert!(response.has_expired());
    }

    #[test]
    fn test_fresh_response_has_not_expired() {
        let response = DiscoveryResponse::new(
            false,
            Utc::now() + Duration::hours(1),
            202,
            HashMap::new(),
            json!({}),
        );
        assert!(!response.has_expired());
    }

    #[test]
    fn test_serde_round_trip_is_lossless() {
        let response = DiscoveryResponse::new(
            false,
            Utc::now() + Duration::minutes(30),
            200,
            HashMap::from([("x-request-id".to_string(), vec!["a".into(), "b".into()])]),
            json!({"response": {"client_id": "id"}}),
        );

        let bytes = serde_json::to_vec(&response).unwrap();
        let decoded: DiscoveryResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded, response);
    }
}
