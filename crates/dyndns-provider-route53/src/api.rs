//! Route53 API seam
//!
//! The provider talks to Route53 only through [`Route53Api`], which covers the
//! three calls it needs. The production implementation lives in `sdk.rs`;
//! tests substitute an in-memory fake.

use async_trait::async_trait;
use dyndns_core::Result;

/// A hosted zone as listed by Route53
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedZone {
    /// Zone id, possibly carrying the `/hostedzone/` prefix
    pub id: String,
    /// Zone name in trailing-dot form (`example.com.`)
    pub name: String,
}

/// One page of the hosted zone directory
#[derive(Debug, Clone, Default)]
pub struct HostedZonePage {
    pub zones: Vec<HostedZone>,
    /// Marker for the next page; `None` on the last page
    pub next_marker: Option<String>,
}

/// A resource record set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    /// Name in trailing-dot form; Route53 escapes some characters as `\NNN`
    pub name: String,
    pub record_type: String,
    pub ttl: Option<i64>,
    pub values: Vec<String>,
}

/// Change action of a record set change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Upsert,
}

/// A single record set change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordChange {
    pub action: ChangeAction,
    pub record_set: RecordSet,
}

/// The subset of the Route53 API used by the provider
#[async_trait]
pub trait Route53Api: Send + Sync {
    /// List one page of hosted zones starting at `marker`
    async fn list_hosted_zones(&self, marker: Option<String>) -> Result<HostedZonePage>;

    /// List record sets of a zone starting at (name, type)
    async fn list_resource_record_sets(
        &self,
        zone_id: &str,
        start_name: &str,
        start_type: &str,
        max_items: i32,
    ) -> Result<Vec<RecordSet>>;

    /// Submit a change batch to a zone
    async fn change_resource_record_sets(
        &self,
        zone_id: &str,
        changes: Vec<RecordChange>,
    ) -> Result<()>;
}
