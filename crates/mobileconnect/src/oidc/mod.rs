//! # Authorization Code flow
//!
//! The four-phase OpenID Connect Authorization Code flow against the
//! endpoints named in a [`DiscoveryResponse`](crate::discovery::DiscoveryResponse):
//!
//! 1. **Start** - build and issue the authorization request, yielding the
//!    redirect target for the end user.
//! 2. **ParseRedirect** - extract `error`, `error_description`, `error_uri`,
//!    `state` and `code` from the redirect URL the application received.
//! 3. **RequestToken** - exchange the authorization code for tokens.
//! 4. **ParseIDToken** - decode the ID token claims, optionally verifying
//!    the signature against the operator's JWK Set.
//!
//! Phases are logically sequential but delivered through independent calls:
//! the end user's browser redirect sits between Start and ParseRedirect, so
//! ordering is a usage contract carried by the caller-held
//! [`MobileConnectState`](crate::state::MobileConnectState), not tracked
//! here. Every phase delivers exactly one outcome - success value or typed
//! [`OidcError`] - through a caller-supplied `FnOnce` result sink.
//!
//! Each network-touching phase re-validates the discovery response's
//! freshness first; an expired response fails with
//! [`OidcError::DiscoveryExpired`] before any transport call, because the
//! remedy is to re-run discovery, not to retry the phase.

mod flow;
mod id_token;
mod redirect;

pub use flow::{AuthenticationStarted, OidcFlow, TokenResult};
pub use id_token::{IdTokenClaims, ParsedIdToken};
pub use redirect::ParsedAuthenticationResponse;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::transport::TransportError;

/// Authorization code flow errors
#[derive(Debug, Error)]
pub enum OidcError {
    /// The supplied discovery response's ttl has passed; re-run discovery
    #[error("discovery response expired at {expired_at}")]
    DiscoveryExpired {
        /// When the discovery response expired
        expired_at: DateTime<Utc>,
    },

    /// Malformed input, transport failure or unusable endpoint response
    #[error("protocol error: {reason}")]
    Protocol {
        /// What went wrong
        reason: String,
    },

    /// The operator endpoint rejected the request
    #[error("operator rejected the request: {error}")]
    Rejected {
        /// The operator's `error` code
        error: String,
        /// The operator's `error_description`, when present
        error_description: Option<String>,
        /// The operator's `error_uri`, when present
        error_uri: Option<String>,
    },
}

impl OidcError {
    pub(crate) fn protocol(reason: impl Into<String>) -> Self {
        Self::Protocol {
            reason: reason.into(),
        }
    }
}

impl From<TransportError> for OidcError {
    fn from(e: TransportError) -> Self {
        Self::protocol(format!("transport failure: {e}"))
    }
}
