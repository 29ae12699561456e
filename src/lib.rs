//! geoip-headers Library
//!
//! Tower middleware that resolves the client IP of each request, looks it
//! up in a geolocation database and adds the result as response headers.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;

// Re-export commonly used types
pub use adapters::inbound::{GeoIpLayer, GeoIpService, RemoteAddr};
pub use adapters::outbound::{DashMapGeoLookup, MaxMindGeoLookup};
pub use application::GeoEnrichmentService;
pub use config::{load_config, Config, GeoHeaderNames, HeaderNameConfig};
pub use domain::entities::{ClientGeo, GeoHeaderValues, GeoRecord};
pub use domain::errors::{AddressFormatError, ConfigError, LookupError};
pub use domain::ports::GeoLookup;
pub use domain::services::resolve_client_ip;
