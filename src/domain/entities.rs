//! Domain Entities - Core business objects
//!
//! The geolocation record returned by a lookup and the header values
//! derived from it. No dependency on any particular database format
//! beyond field naming, which follows the MaxMind City/Country layout.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;

/// Locale used for the localized country and city names.
pub const NAME_LOCALE: &str = "en";

/// Country section of a geolocation record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
    /// Country code (ISO 3166-1 alpha-2)
    #[serde(default)]
    pub iso_code: Option<String>,
    /// Whether the country is a member state of the European Union
    #[serde(default)]
    pub is_in_european_union: Option<bool>,
    /// Localized names keyed by locale code
    #[serde(default)]
    pub names: HashMap<String, String>,
}

/// City section of a geolocation record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    /// Localized names keyed by locale code
    #[serde(default)]
    pub names: HashMap<String, String>,
}

/// Location section of a geolocation record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// IANA time zone name (e.g. "Europe/Paris")
    #[serde(default)]
    pub time_zone: Option<String>,
}

/// Geographic information resolved from an IP address.
///
/// Every lookup produces a fresh value; records are never shared
/// between requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoRecord {
    #[serde(default)]
    pub country: CountryRecord,
    #[serde(default)]
    pub city: CityRecord,
    #[serde(default)]
    pub location: LocationRecord,
}

impl GeoRecord {
    /// English country name, if the record carries one.
    pub fn country_name(&self) -> Option<&str> {
        self.country.names.get(NAME_LOCALE).map(String::as_str)
    }

    /// English city name, if the record carries one.
    pub fn city_name(&self) -> Option<&str> {
        self.city.names.get(NAME_LOCALE).map(String::as_str)
    }
}

/// Resolved client address and its record, attached to the request
/// for handlers further down the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientGeo {
    pub ip: IpAddr,
    pub record: GeoRecord,
}

/// The seven formatted header values emitted for a record.
///
/// Absent text fields become empty strings, an absent EU flag becomes
/// `"false"` and absent coordinates become `0.000000`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoHeaderValues {
    pub country_code: String,
    pub country_is_eu: String,
    pub country_name: String,
    pub city_name: String,
    pub latitude: String,
    pub longitude: String,
    pub time_zone: String,
}

impl GeoHeaderValues {
    pub fn from_record(record: &GeoRecord) -> Self {
        Self {
            country_code: record.country.iso_code.clone().unwrap_or_default(),
            country_is_eu: record
                .country
                .is_in_european_union
                .unwrap_or(false)
                .to_string(),
            country_name: record.country_name().unwrap_or_default().to_string(),
            city_name: record.city_name().unwrap_or_default().to_string(),
            latitude: format_coordinate(record.location.latitude),
            longitude: format_coordinate(record.location.longitude),
            time_zone: record.location.time_zone.clone().unwrap_or_default(),
        }
    }
}

fn format_coordinate(value: Option<f64>) -> String {
    format!("{:.6}", value.unwrap_or(0.0))
}
