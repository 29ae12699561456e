//! GeoIP Lookup Port
//!
//! Defines the interface for resolving IP addresses to geolocation records.

use crate::domain::entities::GeoRecord;
use crate::domain::errors::LookupError;
use std::net::IpAddr;

/// Lookup of an IP address in a geolocation database.
///
/// This is an outbound port that abstracts the database. Implementations
/// are shared by every in-flight request, so they must support concurrent
/// read-only queries.
pub trait GeoLookup: Send + Sync {
    /// Look up the record for an IP address.
    ///
    /// Returns `LookupError::NotFound` when the database has no entry
    /// for the address.
    fn lookup(&self, ip: IpAddr) -> Result<GeoRecord, LookupError>;
}
