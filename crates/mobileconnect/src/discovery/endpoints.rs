//! Operator endpoint extraction
//!
//! A discovery payload names the operator's OIDC endpoints as a link
//! relation list under `response.apis.operatorid.link`, alongside the
//! client credentials issued for that operator. This is a minimal
//! representation containing only the fields the flow needs; everything
//! else in the payload is ignored.

use serde_json::Value;
use thiserror::Error;

/// Endpoint extraction errors
#[derive(Debug, Clone, Error)]
pub enum EndpointsError {
    /// A required piece of the payload was missing
    #[error("discovery payload is missing {0}")]
    Missing(&'static str),
}

/// OIDC endpoints and client credentials for one operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorEndpoints {
    authorization: String,
    token: Option<String>,
    userinfo: Option<String>,
    jwks: Option<String>,
    client_id: String,
    client_secret: Option<String>,
}

impl OperatorEndpoints {
    /// Extract endpoints and credentials from a discovery payload.
    ///
    /// The authorization endpoint and client id are required; token,
    /// userinfo and jwks links are optional here and validated by the flow
    /// phase that needs them.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointsError::Missing`] when a required piece is absent.
    pub fn from_response_data(data: &Value) -> Result<Self, EndpointsError> {
        let response = data
            .get("response")
            .ok_or(EndpointsError::Missing("response object"))?;

        let client_id = response
            .get("client_id")
            .and_then(Value::as_str)
            .ok_or(EndpointsError::Missing("client_id"))?
            .to_string();
        let client_secret = response
            .get("client_secret")
            .and_then(Value::as_str)
            .map(str::to_string);

        let links = response
            .pointer("/apis/operatorid/link")
            .and_then(Value::as_array)
            .ok_or(EndpointsError::Missing("apis.operatorid.link"))?;

        let authorization = Self::link(links, "authorization")
            .ok_or(EndpointsError::Missing("authorization link"))?;

        Ok(Self {
            authorization,
            token: Self::link(links, "token"),
            userinfo: Self::link(links, "userinfo"),
            jwks: Self::link(links, "jwks"),
            client_id,
            client_secret,
        })
    }

    fn link(links: &[Value], rel: &str) -> Option<String> {
        links
            .iter()
            .find(|link| link.get("rel").and_then(Value::as_str) == Some(rel))
            .and_then(|link| link.get("href").and_then(Value::as_str))
            .map(str::to_string)
    }

    /// Authorization endpoint URL.
    pub fn authorization(&self) -> &str {
        &self.authorization
    }

    /// Token endpoint URL, if the operator published one.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// UserInfo endpoint URL, if the operator published one.
    pub fn userinfo(&self) -> Option<&str> {
        self.userinfo.as_deref()
    }

    /// JWK Set URL, if the operator published one.
    pub fn jwks(&self) -> Option<&str> {
        self.jwks.as_deref()
    }

    /// Client id issued for this operator.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Client secret issued for this operator, if any.
    pub fn client_secret(&self) -> Option<&str> {
        self.client_secret.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "response": {
                "client_id": "operator-client",
                "client_secret": "operator-secret",
                "apis": {
                    "operatorid": {
                        "link": [
                            {"rel": "authorization", "href": "https://operator.example.com/authorize"},
                            {"rel": "token", "href": "https://operator.example.com/token"},
                            {"rel": "userinfo", "href": "https://operator.example.com/userinfo"},
                            {"rel": "jwks", "href": "https://operator.example.com/jwks"}
                        ]
                    }
                }
            }
        })
    }

    #[test]
    fn test_extracts_all_links_and_credentials() {
        let endpoints = OperatorEndpoints::from_response_data(&payload()).unwrap();
        assert_eq!(
            endpoints.authorization(),
            "https://operator.example.com/authorize"
        );
        assert_eq!(endpoints.token(), Some("https://operator.example.com/token"));
        assert_eq!(
            endpoints.userinfo(),
            Some("https://operator.example.com/userinfo")
        );
        assert_eq!(endpoints.jwks(), Some("https://operator.example.com/jwks"));
        assert_eq!(endpoints.client_id(), "operator-client");
        assert_eq!(endpoints.client_secret(), Some("operator-secret"));
    }

    #[test]
    fn test_missing_authorization_link_is_an_error() {
        let data = json!({
            "response": {
                "client_id": "operator-client",
                "apis": {"operatorid": {"link": [
                    {"rel": "token", "href": "https://operator.example.com/token"}
                ]}}
            }
        });
        assert!(matches!(
            OperatorEndpoints::from_response_data(&data),
            Err(EndpointsError::Missing("authorization link"))
        ));
    }

    #[test]
    fn test_missing_client_id_is_an_error() {
        let data = json!({"response": {"apis": {"operatorid": {"link": []}}}});
        assert!(matches!(
            OperatorEndpoints::from_response_data(&data),
            Err(EndpointsError::Missing("client_id"))
        ));
    }
}
