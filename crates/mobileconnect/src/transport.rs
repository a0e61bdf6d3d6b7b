//! HTTP transport collaborator
//!
//! The flow issues its authorization, token and JWKS requests through this
//! seam. The bundled [`ReqwestTransport`] never follows redirects: the
//! authorization endpoint's redirect target is part of the flow's result,
//! not something to chase.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::TimeoutOptions;

/// Transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// A request failed before a response was received
    #[error("request to {url} failed: {reason}")]
    Request {
        /// Request URL
        url: String,
        /// Connection or timeout failure detail
        reason: String,
    },
}

/// Status, headers and body of a transport response.
///
/// Headers are lower-cased names mapped to ordered values.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HashMap<String, Vec<String>>,
    /// Raw response body
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Whether the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the status code is a redirect.
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }

    /// First value of the named header, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

/// HTTP collaborator consumed by the authorization code flow.
#[async_trait]
pub trait HttpTransport: Send + Sync + fmt::Debug {
    /// Issue a GET request.
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError>;

    /// Issue a form-encoded POST request, optionally with an
    /// `Authorization` header value.
    async fn post_form(
        &self,
        url: &str,
        params: &[(String, String)],
        authorization: Option<String>,
    ) -> Result<TransportResponse, TransportError>;
}

/// Transport over [`reqwest`] with the configured timeout and redirect
/// following disabled.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with the given timeout options.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] if the HTTP client cannot be
    /// constructed.
    pub fn new(options: TimeoutOptions) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout())
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    async fn into_response(
        url: &str,
        response: reqwest::Response,
    ) -> Result<TransportResponse, TransportError> {
        let status = response.status().as_u16();

        let mut headers: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers
                    .entry(name.as_str().to_ascii_lowercase())
                    .or_default()
                    .push(value.to_string());
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Request {
                url: url.to_string(),
                reason: format!("failed to read response body: {e}"),
            })?
            .to_vec();

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        let response =
            self.client
                .get(url)
                .send()
                .await
                .map_err(|e| TransportError::Request {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;
        Self::into_response(url, response).await
    }

    async fn post_form(
        &self,
        url: &str,
        params: &[(String, String)],
        authorization: Option<String>,
    ) -> Result<TransportResponse, TransportError> {
        let mut request = self.client.post(url).form(params);
        if let Some(authorization) = authorization {
            request = request.header(reqwest::header::AUTHORIZATION, authorization);
        }

        let response = request.send().await.map_err(|e| TransportError::Request {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Self::into_response(url, response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_status_classes() {
        let response = TransportResponse {
            status: 302,
            headers: HashMap::from([("location".to_string(), vec!["https://op".to_string()])]),
            body: Vec::new(),
        };
        assert!(response.is_redirect());
        assert!(!response.is_success());
        assert_eq!(response.header("Location"), Some("https://op"));
        assert_eq!(response.header("content-type"), None);
    }

    #[test]
    fn test_transport_construction_uses_timeout_options() {
        let transport = ReqwestTransport::new(TimeoutOptions::new().with_timeout_ms(1_000));
        assert!(transport.is_ok());
    }
}
