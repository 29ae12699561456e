use crate::domain::errors::ConfigError;
use axum::http::HeaderName;
use serde::Deserialize;

/// Output header names, one per emitted field.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HeaderNameConfig {
    pub country_code: String,
    pub country_is_eu: String,
    pub country_name: String,
    pub city_name: String,
    pub location_lat: String,
    pub location_lon: String,
    pub location_tz: String,
}

impl Default for HeaderNameConfig {
    fn default() -> Self {
        Self {
            country_code: "X-Geoip-Country-Code".to_string(),
            country_is_eu: "X-Geoip-Country-Eu".to_string(),
            country_name: "X-Geoip-Country-Name".to_string(),
            city_name: "X-Geoip-City-Name".to_string(),
            location_lat: "X-Geoip-Location-Lat".to_string(),
            location_lon: "X-Geoip-Location-Lon".to_string(),
            location_tz: "X-Geoip-Location-Tz".to_string(),
        }
    }
}

impl HeaderNameConfig {
    /// Validate every configured name as an HTTP header name.
    pub fn parse(&self) -> Result<GeoHeaderNames, ConfigError> {
        Ok(GeoHeaderNames {
            country_code: parse_header_name("country_code", &self.country_code)?,
            country_is_eu: parse_header_name("country_is_eu", &self.country_is_eu)?,
            country_name: parse_header_name("country_name", &self.country_name)?,
            city_name: parse_header_name("city_name", &self.city_name)?,
            location_lat: parse_header_name("location_lat", &self.location_lat)?,
            location_lon: parse_header_name("location_lon", &self.location_lon)?,
            location_tz: parse_header_name("location_tz", &self.location_tz)?,
        })
    }
}

fn parse_header_name(field: &'static str, name: &str) -> Result<HeaderName, ConfigError> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|_| ConfigError::InvalidHeaderName {
        field,
        name: name.to_string(),
    })
}

/// Validated output header names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoHeaderNames {
    pub country_code: HeaderName,
    pub country_is_eu: HeaderName,
    pub country_name: HeaderName,
    pub city_name: HeaderName,
    pub location_lat: HeaderName,
    pub location_lon: HeaderName,
    pub location_tz: HeaderName,
}

impl GeoHeaderNames {
    /// All names, in emission order.
    pub fn all(&self) -> [&HeaderName; 7] {
        [
            &self.country_code,
            &self.country_is_eu,
            &self.country_name,
            &self.city_name,
            &self.location_lat,
            &self.location_lon,
            &self.location_tz,
        ]
    }
}

impl Default for GeoHeaderNames {
    fn default() -> Self {
        Self {
            country_code: HeaderName::from_static("x-geoip-country-code"),
            country_is_eu: HeaderName::from_static("x-geoip-country-eu"),
            country_name: HeaderName::from_static("x-geoip-country-name"),
            city_name: HeaderName::from_static("x-geoip-city-name"),
            location_lat: HeaderName::from_static("x-geoip-location-lat"),
            location_lon: HeaderName::from_static("x-geoip-location-lon"),
            location_tz: HeaderName::from_static("x-geoip-location-tz"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub db_path: String,
    /// Trust `X-Forwarded-For`. Only safe behind a proxy that rewrites it.
    pub trust_forwarded_for: bool,
    pub debug: bool,
    pub headers: HeaderNameConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            db_path: "GeoLite2-City.mmdb".to_string(),
            trust_forwarded_for: false,
            debug: false,
            headers: HeaderNameConfig::default(),
        }
    }
}

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false)
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

pub fn load_config() -> anyhow::Result<Config> {
    let defaults = HeaderNameConfig::default();

    let listen_addr = std::env::var("GEOIP_LISTEN_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let db_path = std::env::var("GEOIP_DB_PATH")
        .unwrap_or_else(|_| "GeoLite2-City.mmdb".to_string());

    let trust_forwarded_for = env_flag("GEOIP_TRUST_FORWARDED_FOR");

    let debug = std::env::var("DEBUG").is_ok();

    // Output header names
    let headers = HeaderNameConfig {
        country_code: env_or("GEOIP_HEADER_COUNTRY_CODE", defaults.country_code),
        country_is_eu: env_or("GEOIP_HEADER_COUNTRY_IS_EU", defaults.country_is_eu),
        country_name: env_or("GEOIP_HEADER_COUNTRY_NAME", defaults.country_name),
        city_name: env_or("GEOIP_HEADER_CITY_NAME", defaults.city_name),
        location_lat: env_or("GEOIP_HEADER_LOCATION_LAT", defaults.location_lat),
        location_lon: env_or("GEOIP_HEADER_LOCATION_LON", defaults.location_lon),
        location_tz: env_or("GEOIP_HEADER_LOCATION_TZ", defaults.location_tz),
    };

    Ok(Config {
        listen_addr,
        db_path,
        trust_forwarded_for,
        debug,
        headers,
    })
}
