//! Adapters Layer
//!
//! Inbound: the tower middleware driven by the host server.
//! Outbound: geolocation database implementations of the lookup port.

pub mod inbound;
pub mod outbound;
