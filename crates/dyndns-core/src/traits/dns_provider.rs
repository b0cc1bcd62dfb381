// # DNS Provider Trait
//
// Defines the capability every DNS backend must satisfy.
//
// ## Implementations
//
// - netcup CCP: `dyndns-provider-netcup` crate (session-authenticated)
// - AWS Route53: `dyndns-provider-route53` crate (zone directory lookup)
//
// ## Usage
//
// ```rust,ignore
// use dyndns_core::{DnsProvider, DnsRecord};
//
// async fn refresh(provider: &dyn DnsProvider) -> dyndns_core::Result<()> {
//     let record = DnsRecord::address(
//         "home.example.com",
//         std::net::IpAddr::from([203, 0, 113, 9]),
//         60,
//     );
//     provider.update_record("example.com", &record).await
// }
// ```

use async_trait::async_trait;

use crate::record::{DnsRecord, RecordType};

/// Trait for DNS provider implementations
///
/// Exactly one provider instance is active per process. It is constructed
/// at startup, shared by every concurrent request through an `Arc`, and
/// released with [`DnsProvider::close`] on shutdown.
///
/// # Thread Safety
///
/// Implementations must be usable from many tasks at once. Any state they
/// keep (sessions, zone caches) is owned and synchronized by the provider
/// itself; nothing outside the provider may touch it.
///
/// # Errors
///
/// Providers wrap backend failures with context (login failure, malformed
/// payload, non-success status, rate limiting). Callers at the protocol
/// boundary treat every error as one opaque "update failed" condition.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Backend identifier (e.g. "netcup_ccp", "aws_route53")
    fn name(&self) -> &'static str;

    /// Look up the record for `hostname` of `record_type` inside `domain`
    ///
    /// # Returns
    ///
    /// - `Ok(DnsRecord)`: the canonical matching record
    /// - `Err(Error::NotFound)`: no record matches
    /// - `Err(_)`: the backend could not be queried
    async fn get_record(
        &self,
        domain: &str,
        hostname: &str,
        record_type: &RecordType,
    ) -> Result<DnsRecord, crate::Error>;

    /// Upsert `record` inside `domain`
    ///
    /// - Record absent → create it
    /// - Record present with a different value → update it in place
    /// - Record present with the same value → no backend write at all
    ///
    /// # Idempotency
    ///
    /// Repeating the call with the same value must not issue any mutating
    /// backend request. Frequently polling routers depend on this to stay
    /// below backend rate limits.
    async fn update_record(&self, domain: &str, record: &DnsRecord) -> Result<(), crate::Error>;

    /// Best-effort release of backend resources (e.g. logout)
    ///
    /// Must succeed when there is nothing to release. Callers bound this
    /// with a timeout, so implementations should not retry internally.
    async fn close(&self) -> Result<(), crate::Error>;
}

/// Helper trait for constructing DNS providers from configuration
///
/// Construction is async because some backends resolve credentials or
/// regional endpoints through asynchronous configuration chains.
#[async_trait]
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this provider
    ///
    /// # Returns
    ///
    /// A boxed DnsProvider trait object
    async fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn DnsProvider>, crate::Error>;
}
