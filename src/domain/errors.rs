//! Domain Errors
//!
//! Failures of the enrichment step. None of these ever abort a request:
//! the middleware logs them and forwards the request without geo headers.

use std::net::IpAddr;

/// The client address could not be determined from the request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressFormatError {
    #[error("request carries no remote address")]
    MissingRemoteAddr,
    #[error("address {0:?}: missing port in address")]
    MissingPort(String),
    #[error("address {0:?}: too many colons in address")]
    TooManyColons(String),
    #[error("address {0:?}: missing ']' in address")]
    MissingBracket(String),
    #[error("address {0:?}: unexpected bracket in address")]
    UnexpectedBracket(String),
    #[error("X-Forwarded-For header is not valid text")]
    InvalidForwardedFor,
    #[error("unable to parse address {0:?}")]
    InvalidIp(String),
}

/// The geolocation database could not produce a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("address {0} not found in geolocation database")]
    NotFound(IpAddr),
    #[error("geolocation database error: {0}")]
    Database(String),
}

/// Invalid startup configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid header name {name:?} configured for {field}")]
    InvalidHeaderName { field: &'static str, name: String },
}
