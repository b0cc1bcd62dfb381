//! Contract Test: Record Reads and Upserts
//!
//! Constraints verified:
//! - Reads resolve (label, type) case-insensitively, apex included
//! - An unchanged value sends no update
//! - A changed value replaces only the matching record and keeps its id
//! - A missing record is created while every other record is preserved
//!
//! If this test fails, updates may clobber unrelated zone records.

mod common;

use common::*;
use dyndns_core::traits::DnsProvider;
use dyndns_core::{DnsRecord, RecordType};

fn zone() -> Vec<dyndns_provider_netcup::api::NetcupRecord> {
    vec![
        record("1", "@", "A", "198.51.100.1"),
        record("2", "Home", "A", "203.0.113.1"),
        record("3", "home", "AAAA", "2001:db8::1"),
        record("4", "mail", "MX", "mx.example.com"),
    ]
}

#[tokio::test]
async fn get_record_matches_label_case_insensitively() {
    let fake = FakeCcp::start(zone()).await;
    let provider = fake.provider();

    let record = provider
        .get_record(DOMAIN, "HOME.example.com", &RecordType::A)
        .await
        .unwrap();

    assert_eq!(record.name, "HOME.example.com");
    assert_eq!(record.record_type, RecordType::A);
    assert_eq!(record.value, "203.0.113.1");
    assert_eq!(record.ttl, 60);
}

#[tokio::test]
async fn get_record_resolves_apex() {
    let fake = FakeCcp::start(zone()).await;
    let provider = fake.provider();

    let record = provider
        .get_record(DOMAIN, "example.com", &RecordType::A)
        .await
        .unwrap();
    assert_eq!(record.value, "198.51.100.1");
}

#[tokio::test]
async fn get_record_reports_not_found() {
    let fake = FakeCcp::start(zone()).await;
    let provider = fake.provider();

    let err = provider
        .get_record(DOMAIN, "mail.example.com", &RecordType::Aaaa)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn unchanged_value_sends_no_update() {
    let fake = FakeCcp::start(zone()).await;
    let provider = fake.provider();

    let record = DnsRecord::address("home.example.com", "203.0.113.1".parse().unwrap(), 60);
    provider.update_record(DOMAIN, &record).await.unwrap();

    assert_eq!(fake.calls("infoDnsRecords"), 1);
    assert_eq!(fake.calls("updateDnsRecords"), 0);
}

#[tokio::test]
async fn equivalent_ipv6_spelling_counts_as_unchanged() {
    let fake = FakeCcp::start(zone()).await;
    let provider = fake.provider();

    let record = DnsRecord::address(
        "home.example.com",
        "2001:0db8:0000::0001".parse().unwrap(),
        60,
    );
    provider.update_record(DOMAIN, &record).await.unwrap();

    assert_eq!(fake.calls("updateDnsRecords"), 0);
}

#[tokio::test]
async fn changed_value_replaces_matching_record_only() {
    let fake = FakeCcp::start(zone()).await;
    let provider = fake.provider();

    let record = DnsRecord::address("home.example.com", "203.0.113.99".parse().unwrap(), 60);
    provider.update_record(DOMAIN, &record).await.unwrap();

    assert_eq!(fake.calls("updateDnsRecords"), 1);

    let sent = fake.last_update().unwrap();
    assert_eq!(sent.len(), 4);

    let replaced: Vec<_> = sent.iter().filter(|r| r.id.as_deref() == Some("2")).collect();
    assert_eq!(replaced.len(), 1);
    assert_eq!(replaced[0].destination, "203.0.113.99");
    assert_eq!(replaced[0].hostname, "home");

    for untouched in ["1", "3", "4"] {
        let original = zone().into_iter().find(|r| r.id.as_deref() == Some(untouched)).unwrap();
        assert!(sent.contains(&original), "record {untouched} changed");
    }
}

#[tokio::test]
async fn missing_record_is_created_alongside_existing_ones() {
    let fake = FakeCcp::start(zone()).await;
    let provider = fake.provider();

    let record = DnsRecord::address("office.example.com", "192.0.2.7".parse().unwrap(), 60);
    provider.update_record(DOMAIN, &record).await.unwrap();

    let sent = fake.last_update().unwrap();
    assert_eq!(sent.len(), 5);

    let created = sent.iter().find(|r| r.hostname == "office").unwrap();
    assert!(created.id.is_none());
    assert_eq!(created.record_type, "A");
    assert_eq!(created.destination, "192.0.2.7");

    // The fake stores what it received; a read now sees the new record
    let read = provider
        .get_record(DOMAIN, "office.example.com", &RecordType::A)
        .await
        .unwrap();
    assert_eq!(read.value, "192.0.2.7");
    assert_eq!(fake.records().len(), 5);
}

#[tokio::test]
async fn update_then_read_uses_one_login() {
    let fake = FakeCcp::start(zone()).await;
    let provider = fake.provider();

    let record = DnsRecord::address("home.example.com", "203.0.113.50".parse().unwrap(), 60);
    provider.update_record(DOMAIN, &record).await.unwrap();
    let read = provider
        .get_record(DOMAIN, "home.example.com", &RecordType::A)
        .await
        .unwrap();

    assert_eq!(read.value, "203.0.113.50");
    assert_eq!(fake.calls("login"), 1);
}
