//! Test doubles for provider contract tests

#![allow(dead_code)]

use dyndns_core::config::ProviderConfig;
use dyndns_core::error::Result;
use dyndns_core::record::values_match;
use dyndns_core::traits::{DnsProvider, DnsProviderFactory};
use dyndns_core::{DnsRecord, Error, RecordType, extract_subdomain};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory provider with label-keyed records and call counters
#[derive(Default)]
pub struct MemoryProvider {
    /// (domain, label, type) → value
    records: Mutex<HashMap<(String, String, String), String>>,
    pub get_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub write_calls: AtomicUsize,
}

impl MemoryProvider {
    pub fn writes(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    fn key(domain: &str, hostname: &str, record_type: &RecordType) -> (String, String, String) {
        (
            domain.to_string(),
            extract_subdomain(hostname, domain),
            record_type.as_str().to_string(),
        )
    }
}

#[async_trait::async_trait]
impl DnsProvider for MemoryProvider {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get_record(
        &self,
        domain: &str,
        hostname: &str,
        record_type: &RecordType,
    ) -> Result<DnsRecord> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let value = self
            .records
            .lock()
            .unwrap()
            .get(&Self::key(domain, hostname, record_type))
            .cloned()
            .ok_or_else(|| Error::not_found(hostname))?;

        Ok(DnsRecord {
            name: hostname.to_string(),
            record_type: record_type.clone(),
            value,
            ttl: 60,
            priority: None,
        })
    }

    async fn update_record(&self, domain: &str, record: &DnsRecord) -> Result<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let key = Self::key(domain, &record.name, &record.record_type);

        let mut records = self.records.lock().unwrap();
        if records
            .get(&key)
            .is_some_and(|value| values_match(value, &record.value))
        {
            return Ok(());
        }

        self.write_calls.fetch_add(1, Ordering::SeqCst);
        records.insert(key, record.value.clone());
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Factory counting how often it builds a provider
pub struct CountingFactory {
    pub created: Arc<AtomicUsize>,
    pub delay: Duration,
}

impl CountingFactory {
    pub fn new(delay: Duration) -> (Self, Arc<AtomicUsize>) {
        let created = Arc::new(AtomicUsize::new(0));
        (
            Self {
                created: Arc::clone(&created),
                delay,
            },
            created,
        )
    }
}

#[async_trait::async_trait]
impl DnsProviderFactory for CountingFactory {
    async fn create(&self, _config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        tokio::time::sleep(self.delay).await;
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryProvider::default()))
    }
}

pub fn custom_config(factory: &str) -> ProviderConfig {
    ProviderConfig::Custom {
        factory: factory.to_string(),
        config: serde_json::json!({}),
    }
}
