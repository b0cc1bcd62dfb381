//! DynDNS request normalization and response rendering
//!
//! Pure functions; the HTTP handler glues them to axum.

use dyndns_core::record::APEX_LABEL;
use dyndns_core::{RecordType, build_hostname};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use url::form_urlencoded;

/// Path prefix of the standard (dyndns2) request form
pub const STANDARD_PATH_PREFIX: &str = "/nic/update";

/// Which request shape a client used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestForm {
    /// `/nic/update?hostname=<name>&myip=<ip>`
    Standard,
    /// `/<percent-encoded-hostname>`
    Compact,
}

impl RequestForm {
    pub fn from_path(path: &str) -> Self {
        if path.starts_with(STANDARD_PATH_PREFIX) {
            Self::Standard
        } else {
            Self::Compact
        }
    }
}

/// DynDNS response status word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    /// Update accepted (also used when the record already had the value)
    Good,
    /// Hostname missing or not splittable
    NotFqdn,
    /// Provider failure or no usable client address
    ServerError,
}

impl ResponseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::NotFqdn => "notfqdn",
            Self::ServerError => "911",
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query parameters read by the handler
///
/// A repeated key keeps its first value; unknown keys are ignored.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UpdateParams {
    pub hostname: Option<String>,
    pub myip: Option<String>,
}

impl UpdateParams {
    pub fn from_query(query: Option<&str>) -> Self {
        let mut params = Self::default();
        let Some(query) = query else {
            return params;
        };

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let slot = match &*key {
                "hostname" => &mut params.hostname,
                "myip" => &mut params.myip,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }
}

/// A parsed, validated update request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateIntent {
    /// Normalized full hostname (`home.example.com`)
    pub hostname: String,
    /// Last two labels (`example.com`)
    pub domain: String,
    /// Everything before the domain, or `@`
    pub subdomain: String,
    pub ip: IpAddr,
    pub record_type: RecordType,
}

impl UpdateIntent {
    pub fn new(hostname: &str, ip: IpAddr) -> Option<Self> {
        let (domain, subdomain) = split_hostname(hostname)?;
        Some(Self::from_parts(domain, subdomain, ip))
    }

    /// Build from an already split hostname
    pub fn from_parts(domain: String, subdomain: String, ip: IpAddr) -> Self {
        Self {
            hostname: build_hostname(&subdomain, &domain),
            domain,
            subdomain,
            ip,
            record_type: RecordType::for_ip(&ip),
        }
    }
}

/// Extract the raw hostname for a request form
///
/// The standard form reads the already-decoded `hostname` query parameter;
/// the compact form percent-decodes the path without its leading slash.
pub fn extract_hostname(form: RequestForm, path: &str, hostname_param: Option<&str>) -> Option<String> {
    let raw = match form {
        RequestForm::Standard => hostname_param?.to_string(),
        RequestForm::Compact => {
            let path = path.strip_prefix('/').unwrap_or(path);
            urlencoding::decode(path)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| path.to_string())
        }
    };

    let raw = raw.trim();
    (!raw.is_empty()).then(|| raw.to_string())
}

/// Decode a still-encoded wildcard marker and lower-case the hostname
///
/// A single trailing dot (fully qualified form) is dropped.
pub fn normalize_hostname(hostname: &str) -> String {
    let hostname = hostname.replace("%2a", "*").replace("%2A", "*");
    let hostname = hostname.strip_suffix('.').unwrap_or(hostname.as_str());
    hostname.to_lowercase()
}

/// Split a normalized hostname into (domain, subdomain)
///
/// The domain is the last two labels; the subdomain is everything before
/// them, or `@` for the apex. Fewer than two labels or any empty label
/// cannot be split.
pub fn split_hostname(hostname: &str) -> Option<(String, String)> {
    let labels: Vec<&str> = hostname.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return None;
    }

    let split = labels.len() - 2;
    let domain = labels[split..].join(".");
    let subdomain = if split == 0 {
        APEX_LABEL.to_string()
    } else {
        labels[..split].join(".")
    };

    Some((domain, subdomain))
}

/// Pick the client address: `myip`, then the first `X-Forwarded-For`
/// entry, then the connection's source address
///
/// The first candidate that parses as an IP literal wins.
pub fn resolve_client_ip(
    myip: Option<&str>,
    forwarded_for: Option<&str>,
    remote: Option<SocketAddr>,
) -> Option<IpAddr> {
    myip.and_then(parse_ip)
        .or_else(|| {
            forwarded_for
                .and_then(|header| header.split(',').next())
                .and_then(parse_ip)
        })
        .or_else(|| remote.map(|addr| addr.ip()))
}

/// Parse an IP literal, tolerating surrounding whitespace and a port suffix
fn parse_ip(candidate: &str) -> Option<IpAddr> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return None;
    }
    candidate
        .parse::<IpAddr>()
        .ok()
        .or_else(|| candidate.parse::<SocketAddr>().ok().map(|addr| addr.ip()))
}

/// Render the response body
///
/// The standard form appends the resolved IP when one is known; the compact
/// form is the status word alone.
pub fn render_response(form: RequestForm, status: ResponseStatus, ip: Option<IpAddr>) -> String {
    match (form, ip) {
        (RequestForm::Standard, Some(ip)) => format!("{status} {ip}\n"),
        _ => format!("{status}\n"),
    }
}
