//! DashMap GeoIP Lookup
//!
//! In-memory implementation of GeoLookup keyed by exact IP address.
//! Useful for tests and for hosts that keep their own address table.

use crate::domain::entities::GeoRecord;
use crate::domain::errors::LookupError;
use crate::domain::ports::GeoLookup;
use dashmap::DashMap;
use std::net::IpAddr;

/// In-memory geolocation table.
///
/// Lookups clone the stored record, so callers always receive a value
/// of their own.
#[derive(Default)]
pub struct DashMapGeoLookup {
    records: DashMap<IpAddr, GeoRecord>,
}

impl DashMapGeoLookup {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record for an address.
    pub fn insert(&self, ip: IpAddr, record: GeoRecord) {
        self.records.insert(ip, record);
    }

    /// Remove the record for an address.
    pub fn remove(&self, ip: &IpAddr) -> Option<GeoRecord> {
        self.records.remove(ip).map(|(_, record)| record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<(IpAddr, GeoRecord)> for DashMapGeoLookup {
    fn from_iter<I: IntoIterator<Item = (IpAddr, GeoRecord)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl GeoLookup for DashMapGeoLookup {
    fn lookup(&self, ip: IpAddr) -> Result<GeoRecord, LookupError> {
        self.records
            .get(&ip)
            .map(|entry| entry.value().clone())
            .ok_or(LookupError::NotFound(ip))
    }
}
