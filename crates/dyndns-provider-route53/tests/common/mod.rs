//! In-memory fake of the Route53 API

#![allow(dead_code)]

use async_trait::async_trait;
use dyndns_core::{Error, Result};
use dyndns_provider_route53::api::{
    HostedZone, HostedZonePage, RecordChange, RecordSet, Route53Api,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Fake Route53 with paginated zones and per-zone sorted record sets
#[derive(Default)]
pub struct FakeRoute53 {
    /// Zone pages, served in order
    pages: Vec<Vec<HostedZone>>,
    /// zone id (without prefix) → record sets
    records: Mutex<HashMap<String, Vec<RecordSet>>>,
    pub list_zone_calls: AtomicUsize,
    pub list_record_calls: AtomicUsize,
    pub change_calls: AtomicUsize,
    pub changes: Mutex<Vec<(String, RecordChange)>>,
}

impl FakeRoute53 {
    pub fn with_zone_pages(pages: Vec<Vec<(&str, &str)>>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|page| {
                    page.into_iter()
                        .map(|(id, name)| HostedZone {
                            id: id.to_string(),
                            name: name.to_string(),
                        })
                        .collect()
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn add_record(&self, zone_id: &str, name: &str, record_type: &str, value: &str) {
        let mut records = self.records.lock().unwrap();
        let sets = records.entry(zone_id.to_string()).or_default();
        sets.push(RecordSet {
            name: name.to_string(),
            record_type: record_type.to_string(),
            ttl: Some(300),
            values: vec![value.to_string()],
        });
        sets.sort_by(|a, b| (&a.name, &a.record_type).cmp(&(&b.name, &b.record_type)));
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Route53Api for FakeRoute53 {
    async fn list_hosted_zones(&self, marker: Option<String>) -> Result<HostedZonePage> {
        self.list_zone_calls.fetch_add(1, Ordering::SeqCst);

        let index: usize = match marker {
            Some(marker) => marker
                .parse()
                .map_err(|_| Error::provider("aws_route53", "bad marker"))?,
            None => 0,
        };

        let zones = self.pages.get(index).cloned().unwrap_or_default();
        let next_marker = (index + 1 < self.pages.len()).then(|| (index + 1).to_string());
        Ok(HostedZonePage { zones, next_marker })
    }

    async fn list_resource_record_sets(
        &self,
        zone_id: &str,
        start_name: &str,
        start_type: &str,
        max_items: i32,
    ) -> Result<Vec<RecordSet>> {
        self.list_record_calls.fetch_add(1, Ordering::SeqCst);

        if zone_id.starts_with("/hostedzone/") {
            return Err(Error::provider("aws_route53", "zone id must be unprefixed"));
        }

        let records = self.records.lock().unwrap();
        let sets = records.get(zone_id).cloned().unwrap_or_default();
        let start = (start_name.to_string(), start_type.to_string());
        Ok(sets
            .into_iter()
            .filter(|set| (set.name.clone(), set.record_type.clone()) >= start)
            .take(usize::try_from(max_items).unwrap_or(0))
            .collect())
    }

    async fn change_resource_record_sets(
        &self,
        zone_id: &str,
        changes: Vec<RecordChange>,
    ) -> Result<()> {
        self.change_calls.fetch_add(1, Ordering::SeqCst);

        let mut records = self.records.lock().unwrap();
        let sets = records.entry(zone_id.to_string()).or_default();
        for change in &changes {
            sets.retain(|set| {
                !(set.name == change.record_set.name
                    && set.record_type == change.record_set.record_type)
            });
            sets.push(change.record_set.clone());
        }
        sets.sort_by(|a, b| (&a.name, &a.record_type).cmp(&(&b.name, &b.record_type)));
        drop(records);

        self.changes
            .lock()
            .unwrap()
            .extend(changes.into_iter().map(|c| (zone_id.to_string(), c)));
        Ok(())
    }
}
