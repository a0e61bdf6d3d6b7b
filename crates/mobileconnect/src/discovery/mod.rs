//! # Discovery result model
//!
//! Value objects for the operator discovery result: the immutable
//! [`DiscoveryResponse`] returned by a discovery service call (or rebuilt
//! from the cache) and the [`OperatorEndpoints`] the authorization code
//! flow extracts from its payload.
//!
//! The discovery network call itself is an external collaborator; this
//! module only models its result.

mod endpoints;
mod response;

pub use endpoints::{EndpointsError, OperatorEndpoints};
pub use response::DiscoveryResponse;
