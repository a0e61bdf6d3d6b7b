//! Caller-held correlation state
//!
//! The four flow phases are separated by the end user's redirect, so the
//! library cannot thread state through a stack frame. The calling
//! application owns a [`MobileConnectState`] instead and carries it across
//! that boundary; the library never retains a reference after returning it.

use crate::discovery::DiscoveryResponse;

/// Immutable per-flow correlation record.
///
/// Constructed in two stages: [`Self::with_discovery_response`] fixes the
/// discovery response and the encrypted MSISDN, then
/// [`Self::merge_state_and_nonce`] produces a new instance with the state
/// and nonce values filled in. No stage mutates an existing instance.
#[derive(Debug, Clone, PartialEq)]
pub struct MobileConnectState {
    discovery_response: DiscoveryResponse,
    encrypted_msisdn: Option<String>,
    state: Option<String>,
    nonce: Option<String>,
}

impl MobileConnectState {
    /// Stage 1: fix the discovery response and encrypted MSISDN; state and
    /// nonce are left unset.
    pub fn with_discovery_response(
        discovery_response: DiscoveryResponse,
        encrypted_msisdn: Option<String>,
    ) -> Self {
        Self {
            discovery_response,
            encrypted_msisdn,
            state: None,
            nonce: None,
        }
    }

    /// Stage 2: produce a new instance carrying `current`'s discovery
    /// response and encrypted MSISDN, with the given state and nonce.
    ///
    /// `current` is left unmodified.
    pub fn merge_state_and_nonce(
        current: &MobileConnectState,
        state: impl Into<String>,
        nonce: impl Into<String>,
    ) -> Self {
        Self {
            discovery_response: current.discovery_response.clone(),
            encrypted_msisdn: current.encrypted_msisdn.clone(),
            state: Some(state.into()),
            nonce: Some(nonce.into()),
        }
    }

    /// The discovery response this flow runs against.
    pub fn discovery_response(&self) -> &DiscoveryResponse {
        &self.discovery_response
    }

    /// The encrypted MSISDN (subscriber_id), if discovery returned one.
    pub fn encrypted_msisdn(&self) -> Option<&str> {
        self.encrypted_msisdn.as_deref()
    }

    /// The state value used in authorization.
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    /// The nonce value used in authorization.
    pub fn nonce(&self) -> Option<&str> {
        self.nonce.as_deref()
    }
}
