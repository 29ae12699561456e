//! Client IP Resolution
//!
//! Determines which address identifies the originating client of a request.
//!
//! `X-Forwarded-For` is a client-suppliable header: unless every request
//! passes through a proxy that rewrites it, a client can put any address
//! there. Strict resolution ignores the header and uses only the
//! transport-level remote address.

use crate::domain::errors::AddressFormatError;
use axum::http::HeaderMap;
use std::net::IpAddr;

/// Forwarding header consulted in non-strict mode.
pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// Separator between hops in the forwarding header.
const FORWARDED_FOR_SEPARATOR: &str = ", ";

/// Resolve the client IP for a request.
///
/// # Arguments
/// * `remote_addr` - The connection's remote address as `host:port`, if known
/// * `headers` - The request headers
/// * `strict` - Ignore `X-Forwarded-For` and use only `remote_addr`
///
/// In non-strict mode a present, non-empty `X-Forwarded-For` wins and its
/// leftmost entry is used. The candidate is parsed as an IPv4 or IPv6
/// literal.
pub fn resolve_client_ip(
    remote_addr: Option<&str>,
    headers: &HeaderMap,
    strict: bool,
) -> Result<IpAddr, AddressFormatError> {
    let candidate = match forwarded_for(headers, strict)? {
        Some(first_hop) => first_hop,
        None => {
            let remote_addr = remote_addr.ok_or(AddressFormatError::MissingRemoteAddr)?;
            split_host_port(remote_addr)?.0
        }
    };

    candidate
        .parse::<IpAddr>()
        .map_err(|_| AddressFormatError::InvalidIp(candidate.to_string()))
}

/// Leftmost `X-Forwarded-For` entry, when the header may be trusted and is
/// non-empty.
fn forwarded_for(headers: &HeaderMap, strict: bool) -> Result<Option<&str>, AddressFormatError> {
    if strict {
        return Ok(None);
    }

    let Some(value) = headers.get(FORWARDED_FOR) else {
        return Ok(None);
    };
    if value.is_empty() {
        return Ok(None);
    }

    let value = value
        .to_str()
        .map_err(|_| AddressFormatError::InvalidForwardedFor)?;

    Ok(value.split(FORWARDED_FOR_SEPARATOR).next())
}

/// Split `host:port` (or `[host]:port`) into host and port.
///
/// IPv6 hosts must be bracketed; the brackets are not part of the
/// returned host. The port may be empty.
pub fn split_host_port(addr: &str) -> Result<(&str, &str), AddressFormatError> {
    let Some(colon) = addr.rfind(':') else {
        return Err(AddressFormatError::MissingPort(addr.to_string()));
    };

    let (host, host_start, host_end) = if addr.starts_with('[') {
        let Some(close) = addr.find(']') else {
            return Err(AddressFormatError::MissingBracket(addr.to_string()));
        };

        if close + 1 == addr.len() {
            return Err(AddressFormatError::MissingPort(addr.to_string()));
        }
        if close + 1 != colon {
            return if addr.as_bytes()[close + 1] == b':' {
                Err(AddressFormatError::TooManyColons(addr.to_string()))
            } else {
                Err(AddressFormatError::MissingPort(addr.to_string()))
            };
        }

        (&addr[1..close], 1, close + 1)
    } else {
        let host = &addr[..colon];
        if host.contains(':') {
            return Err(AddressFormatError::TooManyColons(addr.to_string()));
        }
        (host, 0, 0)
    };

    if addr[host_start..].contains('[') || addr[host_end..].contains(']') {
        return Err(AddressFormatError::UnexpectedBracket(addr.to_string()));
    }

    Ok((host, &addr[colon + 1..]))
}
