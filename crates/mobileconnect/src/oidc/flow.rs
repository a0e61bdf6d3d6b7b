//! The four-phase flow orchestrator

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::config::{AuthenticationOptions, TokenOptions};
use crate::discovery::{DiscoveryResponse, OperatorEndpoints};
use crate::transport::HttpTransport;

use super::id_token::{self, ParsedIdToken};
use super::redirect::{self, ParsedAuthenticationResponse};
use super::OidcError;

/// Outcome of the Start phase: authentication has been initiated and the
/// end user should be sent to the redirect target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationStarted {
    redirect_target: String,
}

impl AuthenticationStarted {
    /// Where to send the end user to complete authentication.
    pub fn redirect_target(&self) -> &str {
        &self.redirect_target
    }
}

/// Outcome of the RequestToken phase.
///
/// Either fully populated from the operator's token response or the phase
/// failed; no partial token is ever produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenResult {
    /// The issued access token
    pub access_token: String,
    /// Token type (Bearer)
    pub token_type: String,
    /// The raw ID token, when issued
    pub id_token: Option<String>,
    /// Refresh token, when issued
    pub refresh_token: Option<String>,
    /// Seconds until the access token expires, when stated
    pub expires_in: Option<u64>,
    /// Granted scope, when stated
    pub scope: Option<String>,
}

/// Token endpoint response wire shape. Success and error fields share one
/// body because operators answer both through the same JSON document.
#[derive(Debug, Deserialize)]
struct WireTokenResponse {
    access_token: Option<String>,
    token_type: Option<String>,
    id_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
    scope: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
    error_uri: Option<String>,
}

/// Orchestrator for the authorization code flow.
///
/// Holds only the transport collaborator; all per-flow state lives with
/// the caller. Each phase method delivers exactly one outcome through its
/// `sink` and returns nothing.
#[derive(Debug, Clone)]
pub struct OidcFlow {
    transport: Arc<dyn HttpTransport>,
}

impl OidcFlow {
    /// Create a flow orchestrator over the given transport.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Phase 1: start authentication against the operator's authorization
    /// endpoint.
    ///
    /// Fails with [`OidcError::DiscoveryExpired`] before any transport call
    /// if `discovery` has expired. On success the sink receives the
    /// redirect target for the end user: the operator's `Location` header
    /// when the endpoint answered with a redirect, otherwise the
    /// authorization URL that was issued.
    pub async fn start_authentication<F>(
        &self,
        discovery: &DiscoveryResponse,
        redirect_uri: &str,
        state: Option<&str>,
        nonce: &str,
        encrypted_msisdn: Option<&str>,
        options: &AuthenticationOptions,
        sink: F,
    ) where
        F: FnOnce(Result<AuthenticationStarted, OidcError>),
    {
        sink(
            self.start_authentication_inner(
                discovery,
                redirect_uri,
                state,
                nonce,
                encrypted_msisdn,
                options,
            )
            .await,
        );
    }

    async fn start_authentication_inner(
        &self,
        discovery: &DiscoveryResponse,
        redirect_uri: &str,
        state: Option<&str>,
        nonce: &str,
        encrypted_msisdn: Option<&str>,
        options: &AuthenticationOptions,
    ) -> Result<AuthenticationStarted, OidcError> {
        require_fresh(discovery)?;
        let endpoints = operator_endpoints(discovery)?;

        let mut url = Url::parse(endpoints.authorization())
            .map_err(|e| OidcError::protocol(format!("invalid authorization endpoint: {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", endpoints.client_id())
                .append_pair("response_type", "code")
                .append_pair("scope", options.scope())
                .append_pair("redirect_uri", redirect_uri)
                .append_pair("nonce", nonce)
                .append_pair("max_age", &options.max_age().to_string())
                .append_pair("acr_values", options.acr_values());
            if let Some(state) = state {
                query.append_pair("state", state);
            }
            if let Some(msisdn) = encrypted_msisdn {
                query.append_pair("login_hint", &format!("ENCR_MSISDN:{msisdn}"));
            }
            if let Some(display) = options.display() {
                query.append_pair("display", display);
            }
            if let Some(prompt) = options.prompt() {
                query.append_pair("prompt", prompt);
            }
            if let Some(ui_locales) = options.ui_locales() {
                query.append_pair("ui_locales", ui_locales);
            }
        }
        let authorization_url = url.to_string();

        debug!(url = %authorization_url, "issuing authorization request");
        let response = self.transport.get(&authorization_url).await?;

        if response.is_redirect() {
            let location = response.header("location").ok_or_else(|| {
                OidcError::protocol("authorization endpoint redirected without a Location header")
            })?;
            return Ok(AuthenticationStarted {
                redirect_target: location.to_string(),
            });
        }
        if response.is_success() {
            // The operator serves the login UI at the authorization URL
            // itself; the end user goes there directly.
            return Ok(AuthenticationStarted {
                redirect_target: authorization_url,
            });
        }
        Err(OidcError::protocol(format!(
            "authorization endpoint returned HTTP {}",
            response.status
        )))
    }

    /// Phase 2: parse the redirect URL received after the user completed
    /// authentication.
    ///
    /// No I/O; the sink receives the extracted components, or a protocol
    /// error when the URL is unparseable or carries neither a code nor an
    /// error.
    pub fn parse_authentication_response<F>(&self, redirect_url: &str, sink: F)
    where
        F: FnOnce(Result<ParsedAuthenticationResponse, OidcError>),
    {
        sink(redirect::parse(redirect_url));
    }

    /// Phase 3: exchange the authorization code for tokens.
    ///
    /// `redirect_uri` must match the one used in the Start phase; the
    /// operator enforces this. Re-validates `discovery` freshness before
    /// touching the network.
    pub async fn request_token<F>(
        &self,
        discovery: &DiscoveryResponse,
        redirect_uri: &str,
        code: &str,
        _options: &TokenOptions,
        sink: F,
    ) where
        F: FnOnce(Result<TokenResult, OidcError>),
    {
        sink(self.request_token_inner(discovery, redirect_uri, code).await);
    }

    async fn request_token_inner(
        &self,
        discovery: &DiscoveryResponse,
        redirect_uri: &str,
        code: &str,
    ) -> Result<TokenResult, OidcError> {
        require_fresh(discovery)?;
        let endpoints = operator_endpoints(discovery)?;
        let token_endpoint = endpoints
            .token()
            .ok_or_else(|| OidcError::protocol("discovery payload names no token endpoint"))?;

        let mut params = vec![
            ("grant_type".to_string(), "authorization_code".to_string()),
            ("code".to_string(), code.to_string()),
            ("redirect_uri".to_string(), redirect_uri.to_string()),
        ];
        let authorization = match endpoints.client_secret() {
            Some(secret) => Some(format!(
                "Basic {}",
                STANDARD.encode(format!("{}:{}", endpoints.client_id(), secret))
            )),
            None => {
                // Public client: authenticate by parameter instead.
                params.push(("client_id".to_string(), endpoints.client_id().to_string()));
                None
            }
        };

        debug!(url = %token_endpoint, "exchanging authorization code for tokens");
        let response = self
            .transport
            .post_form(token_endpoint, &params, authorization)
            .await?;

        let wire: WireTokenResponse = serde_json::from_slice(&response.body).map_err(|e| {
            OidcError::protocol(format!("token endpoint returned unparseable JSON: {e}"))
        })?;

        if let Some(error) = wire.error {
            return Err(OidcError::Rejected {
                error,
                error_description: wire.error_description,
                error_uri: wire.error_uri,
            });
        }
        if !response.is_success() {
            return Err(OidcError::protocol(format!(
                "token endpoint returned HTTP {}",
                response.status
            )));
        }

        match (wire.access_token, wire.token_type) {
            (Some(access_token), Some(token_type)) => Ok(TokenResult {
                access_token,
                token_type,
                id_token: wire.id_token,
                refresh_token: wire.refresh_token,
                expires_in: wire.expires_in,
                scope: wire.scope,
            }),
            _ => Err(OidcError::protocol(
                "token response is missing access_token or token_type",
            )),
        }
    }

    /// Phase 4: decode the ID token's claims, verifying the signature
    /// against the operator's JWK Set when `options` request it.
    ///
    /// Re-validates `discovery` freshness first; the JWK Set location comes
    /// from the same discovery payload as the other endpoints.
    pub async fn parse_id_token<F>(
        &self,
        discovery: &DiscoveryResponse,
        id_token: &str,
        options: &TokenOptions,
        sink: F,
    ) where
        F: FnOnce(Result<ParsedIdToken, OidcError>),
    {
        sink(self.parse_id_token_inner(discovery, id_token, options).await);
    }

    async fn parse_id_token_inner(
        &self,
        discovery: &DiscoveryResponse,
        id_token: &str,
        options: &TokenOptions,
    ) -> Result<ParsedIdToken, OidcError> {
        require_fresh(discovery)?;

        if !options.check_id_token_signature() {
            let claims = id_token::decode_claims(id_token)?;
            return Ok(ParsedIdToken {
                claims,
                signature_verified: false,
            });
        }

        let endpoints = operator_endpoints(discovery)?;
        let jwks_url = endpoints.jwks().ok_or_else(|| {
            OidcError::protocol("signature verification requested but discovery names no JWK Set")
        })?;

        debug!(url = %jwks_url, "fetching operator JWK Set");
        let response = self.transport.get(jwks_url).await?;
        if !response.is_success() {
            return Err(OidcError::protocol(format!(
                "JWK Set endpoint returned HTTP {}",
                response.status
            )));
        }
        let jwks = serde_json::from_slice(&response.body)
            .map_err(|e| OidcError::protocol(format!("unparseable JWK Set: {e}")))?;

        let claims = id_token::verify_signature(id_token, &jwks)?;
        Ok(ParsedIdToken {
            claims,
            signature_verified: true,
        })
    }
}

fn require_fresh(discovery: &DiscoveryResponse) -> Result<(), OidcError> {
    if discovery.has_expired() {
        return Err(OidcError::DiscoveryExpired {
            expired_at: discovery.ttl(),
        });
    }
    Ok(())
}

fn operator_endpoints(discovery: &DiscoveryResponse) -> Result<OperatorEndpoints, OidcError> {
    OperatorEndpoints::from_response_data(discovery.response_data())
        .map_err(|e| OidcError::protocol(e.to_string()))
}
