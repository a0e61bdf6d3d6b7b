//! # Mobile Connect client SDK
//!
//! Client-side federation of mobile-carrier identity: resolve which OpenID
//! Connect endpoints and client credentials an operator exposes for a
//! subscriber, cache that result per carrier with a time-to-live, and run
//! the OIDC Authorization Code flow against the cached endpoints.
//!
//! ## Architecture
//!
//! - [`cache`] - discovery result cache: carrier-derived keys, ttl expiry
//!   with eviction on read, and mandatory scrubbing of subscriber identity
//!   before anything is persisted
//! - [`discovery`] - the immutable discovery response value object and
//!   operator endpoint extraction
//! - [`oidc`] - the four-phase authorization code flow (start, parse
//!   redirect, request token, parse ID token)
//! - [`state`] - the caller-held correlation record threading discovery
//!   result, subscriber id, state and nonce across the redirect boundary
//! - [`config`] - option bags with documented defaults
//! - [`transport`] - the HTTP collaborator seam and the bundled reqwest
//!   transport
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mobileconnect::cache::{DiscoveryCache, DiscoveryCacheKey, InMemoryCacheStorage};
//! use mobileconnect::config::{AuthenticationOptions, TimeoutOptions};
//! use mobileconnect::oidc::OidcFlow;
//! use mobileconnect::state::MobileConnectState;
//! use mobileconnect::transport::ReqwestTransport;
//!
//! # async fn example(discovery: mobileconnect::discovery::DiscoveryResponse)
//! # -> Result<(), Box<dyn std::error::Error>> {
//! let cache = DiscoveryCache::new(Arc::new(InMemoryCacheStorage::new()));
//! let key = DiscoveryCacheKey::from_details(Some("234"), Some("15"));
//!
//! let flow = OidcFlow::new(Arc::new(ReqwestTransport::new(TimeoutOptions::default())?));
//! let session = MobileConnectState::with_discovery_response(discovery.clone(), None);
//! let session = MobileConnectState::merge_state_and_nonce(&session, "state123", "nonce456");
//!
//! flow.start_authentication(
//!     &discovery,
//!     "https://app.example.com/callback",
//!     session.state(),
//!     session.nonce().unwrap_or_default(),
//!     session.encrypted_msisdn(),
//!     &AuthenticationOptions::default(),
//!     |outcome| match outcome {
//!         Ok(started) => println!("send user to {}", started.redirect_target()),
//!         Err(e) => eprintln!("start failed: {e}"),
//!     },
//! )
//! .await;
//! # let _ = (cache, key);
//! # Ok(())
//! # }
//! ```
//!
//! ## Security invariant
//!
//! Subscriber-identifying data (the encrypted MSISDN) never reaches
//! persistent storage. The cache persists a dedicated type that has no
//! subscriber field; see [`cache::DiscoveryCacheValue`].
//!
//! ## Concurrency
//!
//! No internal scheduler or locking: the core suspends only inside the
//! storage and transport collaborators. A [`cache::DiscoveryCache`] is as
//! concurrent as its backend's per-key atomicity; eviction deletes are
//! idempotent so racing readers of an expired key are safe.

pub mod cache;
pub mod config;
pub mod discovery;
pub mod oidc;
pub mod state;
pub mod transport;

#[doc(inline)]
pub use cache::{DiscoveryCache, DiscoveryCacheKey, DiscoveryCacheValue};

#[doc(inline)]
pub use discovery::DiscoveryResponse;

#[doc(inline)]
pub use oidc::{OidcError, OidcFlow};

#[doc(inline)]
pub use state::MobileConnectState;
