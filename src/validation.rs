//! Centralized validation of user-supplied values.
//!
//! This module turns raw strings into the typed values the rest of the
//! crate works with:
//! - IP addresses and CIDR blocks
//! - hostnames taken from URLs or bare host lines
//! - Autonomous System Numbers

use reqwest::Url;
use std::net::IpAddr;

use crate::error::RouteError;
use crate::model::NetworkBlock;

/// Validate an IP address string and return the parsed IpAddr.
///
/// # Examples
/// ```
/// use ccdroutes::validation::validate_ip;
/// assert!(validate_ip("192.168.1.1").is_ok());
/// assert!(validate_ip("::1").is_ok());
/// assert!(validate_ip("invalid").is_err());
/// ```
pub fn validate_ip(ip_str: &str) -> Result<IpAddr, RouteError> {
    ip_str
        .trim()
        .parse()
        .map_err(|_| RouteError::InvalidAddress(ip_str.to_string()))
}

/// Validate an IP address or CIDR string and return the parsed block.
///
/// A plain address becomes a /32 (IPv4) or /128 (IPv6) block.
///
/// # Examples
/// ```
/// use ccdroutes::validation::validate_ip_or_cidr;
/// assert!(validate_ip_or_cidr("192.168.1.1").is_ok());
/// assert!(validate_ip_or_cidr("192.168.0.0/24").is_ok());
/// assert!(validate_ip_or_cidr("192.168.0.1/24").is_err());
/// ```
pub fn validate_ip_or_cidr(ip_str: &str) -> Result<NetworkBlock, RouteError> {
    ip_str.parse()
}

/// Extract the hostname from a URL or a bare host entry.
///
/// Entries without a scheme are read as `http://<entry>`, so ports, paths
/// and user info are all stripped. URL parsing lower-cases the host.
///
/// # Examples
/// ```
/// use ccdroutes::validation::prepare_host;
/// assert_eq!(prepare_host("https://Example.com/path").unwrap(), "example.com");
/// assert_eq!(prepare_host("example.com:8080").unwrap(), "example.com");
/// assert!(prepare_host("http://").is_err());
/// ```
pub fn prepare_host(entry: &str) -> Result<String, RouteError> {
    let entry = entry.trim();
    let url = if entry.contains("://") {
        entry.to_string()
    } else if entry.starts_with("//") {
        format!("http:{}", entry)
    } else {
        format!("http://{}", entry)
    };

    let parsed = Url::parse(&url)
        .map_err(|e| RouteError::InvalidAddress(format!("cannot parse {:?}: {}", entry, e)))?;

    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string()),
        _ => Err(RouteError::InvalidAddress(format!(
            "cannot get hostname from {:?}",
            entry
        ))),
    }
}

/// Parse an Autonomous System Number written as `AS15169`, `as15169` or `15169`.
///
/// # Examples
/// ```
/// use ccdroutes::validation::parse_asn;
/// assert_eq!(parse_asn("AS15169").unwrap(), 15169);
/// assert_eq!(parse_asn("13335").unwrap(), 13335);
/// assert!(parse_asn("AS").is_err());
/// ```
pub fn parse_asn(value: &str) -> Result<u32, RouteError> {
    let trimmed = value.trim();
    let digits = match trimmed.get(..2) {
        Some(prefix) if prefix.eq_ignore_ascii_case("as") => &trimmed[2..],
        _ => trimmed,
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RouteError::Config(format!("invalid ASN: {:?}", value)));
    }

    digits
        .parse()
        .map_err(|_| RouteError::Config(format!("ASN out of range: {:?}", value)))
}
