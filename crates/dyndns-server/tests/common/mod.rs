//! Test doubles for the protocol handler

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use dyndns_core::traits::DnsProvider;
use dyndns_core::{DnsRecord, Error, RecordType, Result};
use http_body_util::BodyExt;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Upsert-semantics provider backed by a map, counting every call
#[derive(Default)]
pub struct FakeProvider {
    /// (domain, name, type) → value
    records: Mutex<HashMap<(String, String, String), String>>,
    pub update_calls: AtomicUsize,
    pub write_calls: AtomicUsize,
    pub close_calls: AtomicUsize,
    pub fail: AtomicBool,
    pub delay: Mutex<Option<Duration>>,
    pub last_record: Mutex<Option<(String, DnsRecord)>>,
}

impl FakeProvider {
    pub fn updates(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    pub fn last(&self) -> Option<(String, DnsRecord)> {
        self.last_record.lock().unwrap().clone()
    }
}

#[async_trait]
impl DnsProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn get_record(
        &self,
        domain: &str,
        hostname: &str,
        record_type: &RecordType,
    ) -> Result<DnsRecord> {
        let key = (
            domain.to_string(),
            hostname.to_string(),
            record_type.as_str().to_string(),
        );
        let value = self
            .records
            .lock()
            .unwrap()
            .get(&key)
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
        *self.last_record.lock().unwrap() = Some((domain.to_string(), record.clone()));

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::provider("fake", "backend unavailable"));
        }

        let key = (
            domain.to_string(),
            record.name.clone(),
            record.record_type.as_str().to_string(),
        );
        let mut records = self.records.lock().unwrap();
        if records.get(&key) != Some(&record.value) {
            self.write_calls.fetch_add(1, Ordering::SeqCst);
            records.insert(key, record.value.clone());
        }
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
