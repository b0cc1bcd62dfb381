//! DNS record value objects
//!
//! Records are built per request and never persisted. Hostname helpers in
//! this module are shared by every backend so that label extraction behaves
//! identically regardless of which provider is active.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Sentinel label for the domain apex
pub const APEX_LABEL: &str = "@";

/// Sentinel label for a wildcard record
pub const WILDCARD_LABEL: &str = "*";

/// DNS record type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// IPv6 address record
    Aaaa,
    /// Any other record type, kept verbatim (upper-cased)
    Other(String),
}

impl RecordType {
    /// Pick the address record type for an IP family
    pub fn for_ip(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => RecordType::A,
            IpAddr::V6(_) => RecordType::Aaaa,
        }
    }

    /// Wire name of the type ("A", "AAAA", ...)
    pub fn as_str(&self) -> &str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Other(name) => name,
        }
    }

    /// Case-insensitive comparison against a backend's type string
    pub fn matches(&self, wire: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(wire)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for RecordType {
    fn from(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "A" => RecordType::A,
            "AAAA" => RecordType::Aaaa,
            other => RecordType::Other(other.to_string()),
        }
    }
}

impl From<String> for RecordType {
    fn from(value: String) -> Self {
        RecordType::from(value.as_str())
    }
}

impl From<RecordType> for String {
    fn from(value: RecordType) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for RecordType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(RecordType::from(s))
    }
}

/// A DNS record as exchanged between the handler and a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Fully-qualified hostname (e.g. "home.example.com")
    pub name: String,
    /// Record type
    pub record_type: RecordType,
    /// Address or target
    pub value: String,
    /// Time-to-live in seconds
    pub ttl: u32,
    /// Priority, for record types that carry one
    pub priority: Option<u16>,
}

impl DnsRecord {
    /// Create an address record for `ip`, choosing A or AAAA from its family
    pub fn address(name: impl Into<String>, ip: IpAddr, ttl: u32) -> Self {
        Self {
            name: name.into(),
            record_type: RecordType::for_ip(&ip),
            value: ip.to_string(),
            ttl,
            priority: None,
        }
    }
}

/// Compare two record values, by parsed address when both are IP literals
pub fn values_match(left: &str, right: &str) -> bool {
    match (left.trim().parse::<IpAddr>(), right.trim().parse::<IpAddr>()) {
        (Ok(l), Ok(r)) => l == r,
        _ => left == right,
    }
}

/// Recover the label of `hostname` below `domain`
///
/// - `"test.example.com"` under `"example.com"` → `"test"`
/// - `"example.com"` under `"example.com"` → `"@"`
/// - `"*.example.com"` under `"example.com"` → `"*"`
///
/// Matching is case-insensitive and the result is lower-cased. A hostname
/// outside `domain` is returned unchanged (lower-cased).
pub fn extract_subdomain(hostname: &str, domain: &str) -> String {
    let hostname = hostname.trim_end_matches('.').to_ascii_lowercase();
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();

    if hostname == domain {
        return APEX_LABEL.to_string();
    }

    match hostname.strip_suffix(&format!(".{domain}")) {
        Some(label) if !label.is_empty() => label.to_string(),
        _ => hostname,
    }
}

/// Join a label and a domain back into a hostname
///
/// The apex sentinel (or an empty label) yields the bare domain.
pub fn build_hostname(subdomain: &str, domain: &str) -> String {
    if subdomain.is_empty() || subdomain == APEX_LABEL {
        domain.to_string()
    } else {
        format!("{subdomain}.{domain}")
    }
}
