//! Enrichment Service - Main application use case
//!
//! Orchestrates the enrichment step: resolving the client IP, looking it
//! up in the geolocation database and formatting the response headers.
//! Failures degrade to "no geo headers"; they never fail the request.

use crate::config::GeoHeaderNames;
use crate::domain::entities::{ClientGeo, GeoHeaderValues, GeoRecord};
use crate::domain::errors::LookupError;
use crate::domain::ports::GeoLookup;
use crate::domain::services::resolve_client_ip;
use axum::http::{HeaderMap, HeaderValue};
use std::sync::Arc;

/// Enrichment service - main application use case.
///
/// Holds no per-request state; one instance serves every request.
pub struct GeoEnrichmentService {
    lookup: Arc<dyn GeoLookup>,
    header_names: GeoHeaderNames,
    trust_forwarded_for: bool,
}

impl GeoEnrichmentService {
    /// Create a new enrichment service.
    ///
    /// # Arguments
    /// * `lookup` - Geolocation database port
    /// * `header_names` - Output header names
    /// * `trust_forwarded_for` - Resolve from `X-Forwarded-For` when present
    pub fn new(
        lookup: Arc<dyn GeoLookup>,
        header_names: GeoHeaderNames,
        trust_forwarded_for: bool,
    ) -> Self {
        Self {
            lookup,
            header_names,
            trust_forwarded_for,
        }
    }

    pub fn trusts_forwarded_for(&self) -> bool {
        self.trust_forwarded_for
    }

    /// Resolve and look up the client of a request.
    ///
    /// Returns None, after logging, if the client address cannot be
    /// resolved or the database has no usable record for it.
    pub fn locate(&self, remote_addr: Option<&str>, headers: &HeaderMap) -> Option<ClientGeo> {
        let client_ip = match resolve_client_ip(remote_addr, headers, !self.trust_forwarded_for) {
            Ok(ip) => ip,
            Err(e) => {
                tracing::debug!("skipping geoip headers: {}", e);
                return None;
            }
        };

        match self.lookup.lookup(client_ip) {
            Ok(record) => Some(ClientGeo {
                ip: client_ip,
                record,
            }),
            Err(LookupError::NotFound(ip)) => {
                tracing::debug!("skipping geoip headers: no record for {}", ip);
                None
            }
            Err(e) => {
                tracing::warn!("geoip lookup failed for {}: {}", client_ip, e);
                None
            }
        }
    }

    /// Locate the client of a request and format its geo headers.
    ///
    /// This is the per-request entry point used by the middleware.
    pub fn enrich(&self, remote_addr: Option<&str>, headers: &HeaderMap) -> Option<(ClientGeo, HeaderMap)> {
        let geo = self.locate(remote_addr, headers)?;
        let geo_headers = self.format_headers(&geo.record);
        tracing::debug!("client {} located in {:?}", geo.ip, geo.record.country.iso_code);
        Some((geo, geo_headers))
    }

    /// Format a record into the seven configured headers.
    ///
    /// A value that cannot be carried in a header (control characters)
    /// is left out on its own.
    pub fn format_headers(&self, record: &GeoRecord) -> HeaderMap {
        let values = GeoHeaderValues::from_record(record);
        let names = &self.header_names;

        let pairs = [
            (&names.country_code, values.country_code),
            (&names.country_is_eu, values.country_is_eu),
            (&names.country_name, values.country_name),
            (&names.city_name, values.city_name),
            (&names.location_lat, values.latitude),
            (&names.location_lon, values.longitude),
            (&names.location_tz, values.time_zone),
        ];

        let mut headers = HeaderMap::with_capacity(pairs.len());
        for (name, value) in pairs {
            match HeaderValue::from_bytes(value.as_bytes()) {
                Ok(value) => {
                    headers.append(name.clone(), value);
                }
                Err(_) => {
                    tracing::debug!("dropping geoip header {}: invalid value {:?}", name, value);
                }
            }
        }
        headers
    }
}
