//! Domain Layer
//!
//! Entities, errors, ports and pure services. Nothing here depends on
//! the HTTP framework or on a concrete geolocation database.

pub mod entities;
pub mod errors;
pub mod ports;
pub mod services;

pub use entities::{ClientGeo, GeoHeaderValues, GeoRecord};
pub use errors::{AddressFormatError, ConfigError, LookupError};
