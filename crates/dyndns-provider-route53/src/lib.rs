// # AWS Route53 DNS Provider
//
// Upserts A/AAAA records in Route53 hosted zones.
//
// ## Zone Discovery
//
// Route53 addresses records by hosted zone id. The id for a domain is found
// by scanning the (paginated) hosted zone directory for an exact name match
// and cached for the lifetime of the provider. Zone ids are cached without
// their `/hostedzone/` prefix.
//
// ## Credentials
//
// No session is modeled. Credentials come from the default AWS chain
// (environment, shared config files, instance or task roles) and are assumed
// to stay valid for the lifetime of the process.

pub mod api;
pub mod sdk;

use api::{ChangeAction, RecordChange, RecordSet, Route53Api};
use async_trait::async_trait;
use dyndns_core::config::ProviderConfig;
use dyndns_core::record::values_match;
use dyndns_core::traits::{DnsProvider, DnsProviderFactory};
use dyndns_core::{DnsRecord, Error, RecordType, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub use sdk::SdkRoute53;

/// Registry name of this provider
pub const PROVIDER_NAME: &str = "aws_route53";

/// Prefix Route53 puts in front of hosted zone ids
const HOSTED_ZONE_PREFIX: &str = "/hostedzone/";

/// AWS Route53 DNS provider
pub struct Route53Provider {
    api: Arc<dyn Route53Api>,

    /// domain (lower-case, no trailing dot) → zone id
    zones: RwLock<HashMap<String, String>>,
}

impl std::fmt::Debug for Route53Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route53Provider").finish_non_exhaustive()
    }
}

impl Route53Provider {
    /// Create a provider over any [`Route53Api`] implementation
    pub fn new(api: Arc<dyn Route53Api>) -> Self {
        Self {
            api,
            zones: RwLock::new(HashMap::new()),
        }
    }

    /// Create a provider using the default AWS configuration chain
    pub async fn from_env(region: Option<String>) -> Self {
        Self::new(Arc::new(SdkRoute53::from_env(region).await))
    }

    /// Resolve the hosted zone id for a domain
    async fn hosted_zone_id(&self, domain: &str) -> Result<String> {
        let key = normalize_domain(domain);

        if let Some(id) = self.zones.read().await.get(&key) {
            return Ok(id.clone());
        }

        let wanted = ensure_trailing_dot(&key);
        let mut marker = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .api
                .list_hosted_zones(marker)
                .await
                .map_err(|e| context("list hosted zones", e))?;
            pages += 1;

            if let Some(zone) = page
                .zones
                .iter()
                .find(|zone| zone.name.eq_ignore_ascii_case(&wanted))
            {
                let id = zone
                    .id
                    .strip_prefix(HOSTED_ZONE_PREFIX)
                    .unwrap_or(zone.id.as_str())
                    .to_string();

                tracing::debug!(domain = %key, zone_id = %id, pages, "route53: hosted zone resolved");
                self.zones.write().await.insert(key, id.clone());
                return Ok(id);
            }

            match page.next_marker {
                Some(next) => marker = Some(next),
                None => break,
            }
        }

        Err(Error::not_found(format!("hosted zone for domain {key}")))
    }

    /// Look up the record set at exactly (fqdn, type)
    async fn find_record_set(
        &self,
        zone_id: &str,
        fqdn: &str,
        record_type: &RecordType,
    ) -> Result<Option<RecordSet>> {
        let sets = self
            .api
            .list_resource_record_sets(zone_id, fqdn, record_type.as_str(), 1)
            .await
            .map_err(|e| context("list record sets", e))?;

        // Listing starts at (name, type) and returns whatever follows when
        // that set does not exist
        Ok(sets.into_iter().next().filter(|set| {
            unescape_name(&set.name).eq_ignore_ascii_case(fqdn) && record_type.matches(&set.record_type)
        }))
    }
}

fn context(call: &str, err: Error) -> Error {
    match err {
        Error::Provider { provider, message } => Error::Provider {
            provider,
            message: format!("{call}: {message}"),
        },
        other => other,
    }
}

fn normalize_domain(domain: &str) -> String {
    domain.trim_end_matches('.').to_ascii_lowercase()
}

fn ensure_trailing_dot(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}

/// Decode Route53's `\NNN` octal escapes (`\052` is `*`)
fn unescape_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut rest = name;

    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let escape = &rest[pos + 1..];

        let code = escape
            .get(..3)
            .filter(|digits| digits.bytes().all(|b| (b'0'..=b'7').contains(&b)))
            .and_then(|digits| u8::from_str_radix(digits, 8).ok());

        match code {
            Some(code) => {
                out.push(char::from(code));
                rest = &escape[3..];
            }
            None => {
                out.push('\\');
                rest = escape;
            }
        }
    }

    out.push_str(rest);
    out
}

#[async_trait]
impl DnsProvider for Route53Provider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn get_record(
        &self,
        domain: &str,
        hostname: &str,
        record_type: &RecordType,
    ) -> Result<DnsRecord> {
        let zone_id = self
            .hosted_zone_id(domain)
            .await
            .map_err(|e| context("get hosted zone", e))?;
        let fqdn = ensure_trailing_dot(hostname);

        let set = self
            .find_record_set(&zone_id, &fqdn, record_type)
            .await?
            .ok_or_else(|| Error::not_found(format!("{hostname} ({record_type})")))?;

        Ok(DnsRecord {
            name: hostname.to_string(),
            record_type: record_type.clone(),
            value: set.values.into_iter().next().unwrap_or_default(),
            ttl: set
                .ttl
                .and_then(|ttl| u32::try_from(ttl).ok())
                .unwrap_or_default(),
            priority: None,
        })
    }

    async fn update_record(&self, domain: &str, record: &DnsRecord) -> Result<()> {
        let zone_id = self
            .hosted_zone_id(domain)
            .await
            .map_err(|e| context("get hosted zone", e))?;
        let fqdn = ensure_trailing_dot(&record.name);

        let existing = self
            .find_record_set(&zone_id, &fqdn, &record.record_type)
            .await?;
        if let Some(existing) = &existing
            && existing
                .values
                .first()
                .is_some_and(|value| values_match(value, &record.value))
        {
            tracing::debug!(name = %record.name, "route53: record already up to date");
            return Ok(());
        }

        let change = RecordChange {
            action: ChangeAction::Upsert,
            record_set: RecordSet {
                name: fqdn,
                record_type: record.record_type.as_str().to_string(),
                ttl: Some(i64::from(record.ttl)),
                values: vec![record.value.clone()],
            },
        };

        self.api
            .change_resource_record_sets(&zone_id, vec![change])
            .await
            .map_err(|e| context("change resource record sets", e))?;

        tracing::info!(
            name = %record.name,
            value = %record.value,
            created = existing.is_none(),
            "route53: record upserted"
        );
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Factory for creating Route53 providers
pub struct Route53Factory;

#[async_trait]
impl DnsProviderFactory for Route53Factory {
    async fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        match config {
            ProviderConfig::AwsRoute53 { region } => {
                config.validate()?;
                let provider = Route53Provider::from_env(region.clone()).await;
                tracing::info!(
                    region = region.as_deref().unwrap_or("<default>"),
                    "route53 provider configured"
                );
                Ok(Box::new(provider))
            }
            _ => Err(Error::config("Invalid config for route53 provider")),
        }
    }
}

/// Register the Route53 provider with a registry
pub fn register(registry: &dyndns_core::ProviderRegistry) -> Result<()> {
    registry.register_provider(PROVIDER_NAME, Box::new(Route53Factory))
}
