// # HTTP Public IP Lookup
//
// Asks a plain-text "what is my IP" service for the address the outside
// world sees. Used by the one-shot `update` command; the server never calls
// it, since routers report their own address.
//
// The service is expected to answer `200` with the bare address as body
// (surrounding whitespace is ignored). The address family must match the
// record type being updated.

use dyndns_core::{Error, RecordType, Result};
use std::net::IpAddr;
use std::time::Duration;

/// Name used in error context
const SOURCE_NAME: &str = "public_ip";

/// IPv4-only lookup service
pub const IPV4_SERVICE: &str = "https://api.ipify.org";

/// IPv6-only lookup service
pub const IPV6_SERVICE: &str = "https://api6.ipify.org";

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// One lookup service bound to the expected address family
#[derive(Debug, Clone)]
pub struct PublicIpLookup {
    url: String,
    expected: RecordType,
    client: reqwest::Client,
}

impl PublicIpLookup {
    /// Query `url` and accept only addresses of `expected`'s family
    ///
    /// # Errors
    ///
    /// Fails for record types other than A/AAAA, or when the HTTP client
    /// cannot be built.
    pub fn new(url: impl Into<String>, expected: RecordType) -> Result<Self> {
        if !matches!(expected, RecordType::A | RecordType::Aaaa) {
            return Err(Error::config(format!(
                "public IP lookup supports A and AAAA records, not {expected}"
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            url: url.into(),
            expected,
            client,
        })
    }

    /// Use the default service for the record type
    pub fn for_record_type(record_type: RecordType) -> Result<Self> {
        let url = match record_type {
            RecordType::Aaaa => IPV6_SERVICE,
            _ => IPV4_SERVICE,
        };
        Self::new(url, record_type)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the current public address
    pub async fn fetch(&self) -> Result<IpAddr> {
        tracing::debug!(url = %self.url, expected = %self.expected, "Looking up public IP");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::provider(SOURCE_NAME, format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::provider(
                SOURCE_NAME,
                format!("unexpected status code: {status}"),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::provider(SOURCE_NAME, format!("failed to read response: {e}")))?;

        let ip = parse_address(&body, &self.expected)?;
        tracing::debug!(%ip, "Public IP resolved");
        Ok(ip)
    }
}

/// Parse a service answer and check its family
fn parse_address(body: &str, expected: &RecordType) -> Result<IpAddr> {
    let text = body.trim();
    let ip: IpAddr = text.parse().map_err(|_| {
        Error::provider(SOURCE_NAME, format!("invalid IP address received: {text}"))
    })?;

    if RecordType::for_ip(&ip) != *expected {
        return Err(Error::provider(
            SOURCE_NAME,
            format!("expected an address for a {expected} record, got {ip}"),
        ));
    }
    Ok(ip)
}
