//! One-shot update with the current public IP

use anyhow::{Context, Result};
use dyndns_core::{DnsProvider, DnsRecord};
use dyndns_ip_http::PublicIpLookup;
use dyndns_server::UpdateIntent;
use dyndns_server::protocol::{normalize_hostname, split_hostname};
use tracing::info;

/// Upsert `hostname` with the address reported by `lookup`
///
/// The hostname is checked before any network call.
pub async fn update_once(
    provider: &dyn DnsProvider,
    lookup: &PublicIpLookup,
    hostname: &str,
    ttl: u32,
) -> Result<UpdateIntent> {
    let hostname = normalize_hostname(hostname);
    let (domain, subdomain) = split_hostname(&hostname)
        .with_context(|| format!("'{hostname}' is not a fully qualified hostname"))?;

    let ip = lookup.fetch().await.context("failed to get public IP")?;
    info!(%ip, url = lookup.url(), "Current public IP");

    let intent = UpdateIntent::from_parts(domain, subdomain, ip);
    let record = DnsRecord::address(intent.hostname.clone(), ip, ttl);

    provider
        .update_record(&intent.domain, &record)
        .await
        .with_context(|| {
            format!(
                "failed to update {} record for {}",
                intent.record_type, intent.hostname
            )
        })?;

    info!(
        hostname = %intent.hostname,
        record_type = %intent.record_type,
        %ip,
        "Record updated"
    );
    Ok(intent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::Router;
    use axum::routing::get;
    use dyndns_core::{Error, RecordType};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingProvider {
        updates: Mutex<Vec<(String, DnsRecord)>>,
    }

    #[async_trait]
    impl DnsProvider for RecordingProvider {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn get_record(
            &self,
            _domain: &str,
            hostname: &str,
            _record_type: &RecordType,
        ) -> dyndns_core::Result<DnsRecord> {
            Err(Error::not_found(hostname))
        }

        async fn update_record(&self, domain: &str, record: &DnsRecord) -> dyndns_core::Result<()> {
            self.updates
                .lock()
                .unwrap()
                .push((domain.to_string(), record.clone()));
            Ok(())
        }

        async fn close(&self) -> dyndns_core::Result<()> {
            Ok(())
        }
    }

    async fn ip_service(body: &'static str) -> String {
        let app = Router::new().route("/", get(move || async move { body }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    #[tokio::test]
    async fn upserts_public_address() {
        let provider = RecordingProvider::default();
        let lookup = PublicIpLookup::new(ip_service("198.51.100.4\n").await, RecordType::A).unwrap();

        let intent = update_once(&provider, &lookup, "Home.Example.com", 300)
            .await
            .unwrap();
        assert_eq!(intent.subdomain, "home");

        let updates = provider.updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        let (domain, record) = &updates[0];
        assert_eq!(domain, "example.com");
        assert_eq!(record.name, "home.example.com");
        assert_eq!(record.record_type, RecordType::A);
        assert_eq!(record.value, "198.51.100.4");
        assert_eq!(record.ttl, 300);
    }

    #[tokio::test]
    async fn unsplittable_hostname_fails_before_lookup() {
        let provider = RecordingProvider::default();
        // Nothing listens on the discard port, so a lookup would fail differently
        let lookup = PublicIpLookup::new("http://127.0.0.1:9/", RecordType::A).unwrap();

        let err = update_once(&provider, &lookup, "localhost", 60)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not a fully qualified hostname"), "{err:#}");
        assert!(provider.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_lookup_writes_nothing() {
        let provider = RecordingProvider::default();
        let lookup = PublicIpLookup::new(ip_service("198.51.100.4").await, RecordType::Aaaa).unwrap();

        let err = update_once(&provider, &lookup, "home.example.com", 60)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to get public IP"), "{err:#}");
        assert!(provider.updates.lock().unwrap().is_empty());
    }
}
