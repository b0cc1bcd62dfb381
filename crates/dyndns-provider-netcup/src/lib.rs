// # netcup CCP DNS Provider
//
// This crate provides a netcup CCP (customer control panel) DNS provider for
// the DynDNS bridge.
//
// ## Session Model
//
// The CCP API requires a short-lived session obtained with a `login` call
// using long-lived credentials (customer number, API key, API password).
// Sessions time out on the backend after 15 minutes; this client treats them
// as valid for 10 minutes so that refresh happens before the backend starts
// rejecting the id.
//
// - Unauthenticated → first call logs in → Authenticated
// - Authenticated → reused while inside the validity window
// - Expired or invalidated → next call logs in again
// - Closed (after `close`) → next call logs in again
//
// At most one login is in flight at a time. See `session.rs`.
//
// ## Update Model
//
// `updateDnsRecords` takes the complete record list of a domain. An upsert is
// therefore read-modify-write: read all records, replace the one matching
// (label, type), send the full list back. When the matching record already
// carries the requested value nothing is sent; this keeps frequently polling
// routers below the 180 requests/minute limit.
//
// ## Security Requirements
//
// - API key, API password and session id NEVER appear in logs
// - Debug output redacts credentials
//
// ## API Reference
//
// - Endpoint: `POST https://ccp.netcup.net/run/webservice/servers/endpoint.php?JSON`
// - Actions: `login`, `infoDnsRecords`, `updateDnsRecords`, `logout`

pub mod api;
pub mod credentials;
mod session;

use api::{
    ApiRequest, ApiResponse, InfoDnsRecordsParams, LoginParams, LoginResponse, NetcupRecord,
    NetcupRecordSet, RATE_LIMIT_STATUS_CODE, SESSION_INVALID_STATUS_CODE, SessionParams,
    UpdateDnsRecordsParams,
};
use async_trait::async_trait;
use dyndns_core::config::ProviderConfig;
use dyndns_core::mask::{mask_value, truncate_for_log};
use dyndns_core::record::values_match;
use dyndns_core::traits::{DnsProvider, DnsProviderFactory};
use dyndns_core::{DnsRecord, Error, RecordType, Result, extract_subdomain};
use serde::Serialize;
use session::{Session, SessionCache};
use std::time::Duration;

pub use credentials::NetcupCredentials;

/// Registry name of this provider
pub const PROVIDER_NAME: &str = "netcup_ccp";

/// Production CCP endpoint
pub const DEFAULT_ENDPOINT: &str =
    "https://ccp.netcup.net/run/webservice/servers/endpoint.php?JSON";

/// Hard session timeout enforced by the backend
pub const SESSION_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Validity window this client assumes for a session (refresh before timeout)
pub const SESSION_LIFETIME: Duration = Duration::from_secs(10 * 60);

/// The CCP API does not expose TTLs; records report this value
pub const REPORTED_TTL: u32 = 60;

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// netcup CCP DNS provider
///
/// One instance is shared by all requests of the process. The session it
/// holds is private and synchronized internally.
pub struct NetcupProvider {
    /// API endpoint
    endpoint: String,

    /// Customer number
    customer_number: String,

    /// API key
    /// ⚠️ NEVER log this value
    api_key: String,

    /// API password
    /// ⚠️ NEVER log this value
    api_password: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Cached session and login serialization
    sessions: SessionCache,
}

// Custom Debug implementation that hides the credentials
impl std::fmt::Debug for NetcupProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetcupProvider")
            .field("endpoint", &self.endpoint)
            .field("customer_number", &mask_value(&self.customer_number))
            .field("api_key", &"<REDACTED>")
            .field("api_password", &"<REDACTED>")
            .field("session_lifetime", &self.sessions.lifetime())
            .finish()
    }
}

impl NetcupProvider {
    /// Create a new netcup provider against the production endpoint
    ///
    /// # Errors
    ///
    /// Fails when any credential is empty or the HTTP client cannot be built.
    pub fn new(
        customer_number: impl Into<String>,
        api_key: impl Into<String>,
        api_password: impl Into<String>,
    ) -> Result<Self> {
        let customer_number = customer_number.into();
        let api_key = api_key.into();
        let api_password = api_password.into();

        if customer_number.is_empty() || api_key.is_empty() || api_password.is_empty() {
            return Err(Error::config(
                "netcup customer number, API key and API password cannot be empty",
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            customer_number,
            api_key,
            api_password,
            client,
            sessions: SessionCache::new(SESSION_LIFETIME),
        })
    }

    /// Use a different CCP endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Change how long a session is considered valid after login
    ///
    /// Values at or above [`SESSION_TIMEOUT`] risk request-time rejections.
    pub fn with_session_lifetime(mut self, lifetime: Duration) -> Self {
        self.sessions = SessionCache::new(lifetime);
        self
    }

    /// Number of successful logins performed by this instance
    pub fn login_count(&self) -> usize {
        self.sessions.login_count()
    }

    /// Drop the current session without logging out
    ///
    /// The next record operation performs a fresh login.
    pub async fn invalidate_session(&self) {
        tracing::debug!("netcup: session invalidated");
        self.sessions.invalidate().await;
    }

    /// Send one API call and parse the envelope
    ///
    /// Returns the envelope as-is; callers decide how a non-success status
    /// maps to an error.
    async fn send<P: Serialize>(&self, action: &str, param: P) -> Result<ApiResponse> {
        let request = ApiRequest { action, param };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER_NAME, format!("{action} request failed: {e}")))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            Error::provider(PROVIDER_NAME, format!("{action}: failed to read response: {e}"))
        })?;

        if status != reqwest::StatusCode::OK {
            return Err(match status.as_u16() {
                429 => Error::rate_limited(format!("{action}: HTTP {status}")),
                _ => Error::provider(
                    PROVIDER_NAME,
                    format!(
                        "{action}: unexpected status code: {status}, body: {}",
                        truncate_for_log(&body)
                    ),
                ),
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::json(format!("{action} response"), e))
    }

    /// Map a non-success envelope to an error
    fn check(action: &str, response: ApiResponse) -> Result<ApiResponse> {
        if response.is_success() {
            return Ok(response);
        }

        let detail = format!(
            "{} - {} (code: {})",
            response.shortmessage, response.longmessage, response.statuscode
        );

        if response.statuscode == RATE_LIMIT_STATUS_CODE {
            tracing::warn!(action, "netcup: rate limit hit (180 req/min): {}", response.longmessage);
            return Err(Error::rate_limited(format!("{action}: {detail}")));
        }

        if action == "login" {
            return Err(Error::auth(format!("netcup login rejected: {detail}")));
        }

        Err(Error::provider(PROVIDER_NAME, format!("{action}: API error: {detail}")))
    }

    /// Perform a login and return the new session id
    async fn login(&self) -> Result<String> {
        tracing::debug!(endpoint = %self.endpoint, "netcup: sending login request");

        let params = LoginParams {
            customernumber: &self.customer_number,
            apikey: &self.api_key,
            apipassword: &self.api_password,
        };
        let response = Self::check("login", self.send("login", params).await?)?;

        let login: LoginResponse = serde_json::from_value(response.responsedata)
            .map_err(|e| Error::json("login response", e))?;

        if login.apisessionid.is_empty() {
            return Err(Error::auth("netcup login returned an empty session id"));
        }

        Ok(login.apisessionid)
    }

    /// Ensure a valid session exists, logging in if needed
    async fn ensure_session(&self) -> Result<Session> {
        self.sessions.get_or_login(|| self.login()).await
    }

    fn session_params(&self, session: &Session) -> SessionParams {
        SessionParams {
            customernumber: self.customer_number.clone(),
            apikey: self.api_key.clone(),
            apisessionid: session.id.clone(),
        }
    }

    /// Send a session-scoped call
    ///
    /// A rejection of the session itself drops it from the cache so that the
    /// next request logs in again instead of reusing a dead id.
    async fn send_with_session<P: Serialize>(
        &self,
        action: &str,
        build: impl FnOnce(SessionParams) -> P,
    ) -> Result<ApiResponse> {
        let session = self
            .ensure_session()
            .await
            .map_err(|e| prefix_error("ensure session", e))?;

        let response = self.send(action, build(self.session_params(&session))).await?;

        if !response.is_success() && response.statuscode == SESSION_INVALID_STATUS_CODE {
            tracing::warn!(action, "netcup: session rejected by backend, dropping it");
            self.sessions.invalidate_if_current(&session.id).await;
        }

        Self::check(action, response)
    }

    /// Retrieve all DNS records of a domain
    async fn info_dns_records(&self, domain: &str) -> Result<Vec<NetcupRecord>> {
        let response = self
            .send_with_session("infoDnsRecords", |session| InfoDnsRecordsParams {
                domainname: domain.to_string(),
                session,
            })
            .await?;

        let set: NetcupRecordSet = serde_json::from_value(response.responsedata)
            .map_err(|e| Error::json("infoDnsRecords records", e))?;

        tracing::debug!(domain, count = set.dnsrecords.len(), "netcup: fetched DNS records");
        Ok(set.dnsrecords)
    }

    /// Replace the record list of a domain
    async fn update_dns_records(&self, domain: &str, records: Vec<NetcupRecord>) -> Result<()> {
        self.send_with_session("updateDnsRecords", |session| UpdateDnsRecordsParams {
            domainname: domain.to_string(),
            dnsrecordset: NetcupRecordSet { dnsrecords: records },
            session,
        })
        .await?;
        Ok(())
    }
}

fn prefix_error(context: &str, err: Error) -> Error {
    match err {
        Error::Provider { provider, message } => Error::Provider {
            provider,
            message: format!("{context}: {message}"),
        },
        other => other,
    }
}

/// Split records into the canonical match for (label, type) and all others
///
/// When the backend returns several matches, the first one is canonical and
/// the rest are kept untouched with the others.
fn partition_records(
    records: Vec<NetcupRecord>,
    label: &str,
    record_type: &RecordType,
) -> (Option<NetcupRecord>, Vec<NetcupRecord>) {
    let mut existing = None;
    let mut others = Vec::with_capacity(records.len());

    for record in records {
        if existing.is_none() && record.matches(label, record_type) {
            existing = Some(record);
        } else {
            others.push(record);
        }
    }

    (existing, others)
}

#[async_trait]
impl DnsProvider for NetcupProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn get_record(
        &self,
        domain: &str,
        hostname: &str,
        record_type: &RecordType,
    ) -> Result<DnsRecord> {
        let label = extract_subdomain(hostname, domain);
        tracing::debug!(domain, hostname, %label, %record_type, "netcup: getting record");

        let records = self
            .info_dns_records(domain)
            .await
            .map_err(|e| prefix_error("get DNS records", e))?;

        let (existing, _) = partition_records(records, &label, record_type);
        let record = existing
            .ok_or_else(|| Error::not_found(format!("{hostname} ({record_type})")))?;

        Ok(DnsRecord {
            name: hostname.to_string(),
            record_type: RecordType::from(record.record_type.as_str()),
            value: record.destination,
            ttl: REPORTED_TTL,
            priority: record.priority.and_then(|p| p.parse().ok()),
        })
    }

    async fn update_record(&self, domain: &str, record: &DnsRecord) -> Result<()> {
        let label = extract_subdomain(&record.name, domain);
        tracing::debug!(
            domain,
            name = %record.name,
            %label,
            record_type = %record.record_type,
            value = %record.value,
            "netcup: updating record"
        );

        let records = self
            .info_dns_records(domain)
            .await
            .map_err(|e| prefix_error("get DNS records", e))?;

        let (existing, mut others) = partition_records(records, &label, &record.record_type);

        if let Some(existing) = &existing
            && values_match(&existing.destination, &record.value)
        {
            tracing::debug!(name = %record.name, "netcup: record already up to date");
            return Ok(());
        }

        let replacement = NetcupRecord {
            id: existing.as_ref().and_then(|r| r.id.clone()),
            hostname: label,
            record_type: record.record_type.as_str().to_string(),
            priority: record.priority.map(|p| p.to_string()),
            destination: record.value.clone(),
            deleterecord: false,
            state: None,
        };
        others.push(replacement);

        self.update_dns_records(domain, others)
            .await
            .map_err(|e| prefix_error("update DNS record", e))?;

        tracing::info!(
            name = %record.name,
            value = %record.value,
            created = existing.is_none(),
            "netcup: record updated"
        );
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let Some(session) = self.sessions.current().await else {
            tracing::debug!("netcup: no session to close");
            return Ok(());
        };

        tracing::debug!("netcup: logging out");
        let result = self
            .send("logout", self.session_params(&session))
            .await
            .and_then(|response| Self::check("logout", response));

        // The session is unusable after close either way
        self.sessions.invalidate_if_current(&session.id).await;

        result.map_err(|e| prefix_error("logout request", e))?;
        tracing::debug!("netcup: logged out");
        Ok(())
    }
}

/// Factory for creating netcup providers
pub struct NetcupFactory;

#[async_trait]
impl DnsProviderFactory for NetcupFactory {
    async fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        match config {
            ProviderConfig::NetcupCcp {
                customer_number,
                api_key,
                api_password,
                endpoint,
            } => {
                config.validate()?;

                let mut provider =
                    NetcupProvider::new(customer_number, api_key, api_password)?;
                if let Some(endpoint) = endpoint {
                    tracing::info!(%endpoint, "netcup: using custom endpoint");
                    provider = provider.with_endpoint(endpoint);
                }

                tracing::info!(
                    customer = %mask_value(customer_number),
                    "netcup provider configured"
                );
                Ok(Box::new(provider))
            }
            _ => Err(Error::config("Invalid config for netcup provider")),
        }
    }
}

/// Register the netcup provider with a registry
///
/// # Example
///
/// ```rust
/// use dyndns_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// dyndns_provider_netcup::register(&registry).unwrap();
/// assert!(registry.has_provider("netcup_ccp"));
/// ```
pub fn register(registry: &dyndns_core::ProviderRegistry) -> Result<()> {
    registry.register_provider(PROVIDER_NAME, Box::new(NetcupFactory))
}
