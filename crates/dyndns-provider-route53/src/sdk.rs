//! [`Route53Api`] over the official AWS SDK

use crate::PROVIDER_NAME;
use crate::api::{ChangeAction, HostedZone, HostedZonePage, RecordChange, RecordSet, Route53Api};
use async_trait::async_trait;
use aws_sdk_route53::Client;
use aws_sdk_route53::config::Region;
use aws_sdk_route53::error::DisplayErrorContext;
use aws_sdk_route53::types::{self, ResourceRecord, ResourceRecordSet, RrType};
use dyndns_core::{Error, Result};

/// Route53 client backed by `aws-sdk-route53`
pub struct SdkRoute53 {
    client: Client,
}

impl std::fmt::Debug for SdkRoute53 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdkRoute53").finish_non_exhaustive()
    }
}

impl SdkRoute53 {
    /// Build a client from the default AWS configuration chain
    /// (environment, shared config files, instance or task roles)
    pub async fn from_env(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let config = loader.load().await;

        tracing::debug!(
            region = config.region().map(|r| r.as_ref()).unwrap_or("<default>"),
            "route53: AWS configuration loaded"
        );

        Self {
            client: Client::new(&config),
        }
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

fn sdk_error(call: &str, err: impl std::error::Error + 'static) -> Error {
    Error::provider(PROVIDER_NAME, format!("{call}: {}", DisplayErrorContext(err)))
}

fn build_error(err: aws_sdk_route53::error::BuildError) -> Error {
    Error::provider(PROVIDER_NAME, format!("build change request: {err}"))
}

#[async_trait]
impl Route53Api for SdkRoute53 {
    async fn list_hosted_zones(&self, marker: Option<String>) -> Result<HostedZonePage> {
        let output = self
            .client
            .list_hosted_zones()
            .set_marker(marker)
            .send()
            .await
            .map_err(|e| sdk_error("list hosted zones", e))?;

        let zones = output
            .hosted_zones()
            .iter()
            .map(|zone| HostedZone {
                id: zone.id().to_string(),
                name: zone.name().to_string(),
            })
            .collect();

        let next_marker = if output.is_truncated() {
            output.next_marker().map(str::to_string)
        } else {
            None
        };

        Ok(HostedZonePage { zones, next_marker })
    }

    async fn list_resource_record_sets(
        &self,
        zone_id: &str,
        start_name: &str,
        start_type: &str,
        max_items: i32,
    ) -> Result<Vec<RecordSet>> {
        let output = self
            .client
            .list_resource_record_sets()
            .hosted_zone_id(zone_id)
            .start_record_name(start_name)
            .start_record_type(RrType::from(start_type))
            .max_items(max_items)
            .send()
            .await
            .map_err(|e| sdk_error("list record sets", e))?;

        Ok(output
            .resource_record_sets()
            .iter()
            .map(|set| RecordSet {
                name: set.name().to_string(),
                record_type: set.r#type().as_str().to_string(),
                ttl: set.ttl(),
                values: set
                    .resource_records()
                    .iter()
                    .map(|r| r.value().to_string())
                    .collect(),
            })
            .collect())
    }

    async fn change_resource_record_sets(
        &self,
        zone_id: &str,
        changes: Vec<RecordChange>,
    ) -> Result<()> {
        let mut batch = types::ChangeBatch::builder();

        for change in changes {
            let action = match change.action {
                ChangeAction::Upsert => types::ChangeAction::Upsert,
            };

            let mut set = ResourceRecordSet::builder()
                .name(change.record_set.name)
                .r#type(RrType::from(change.record_set.record_type.as_str()))
                .set_ttl(change.record_set.ttl);
            for value in change.record_set.values {
                set = set.resource_records(
                    ResourceRecord::builder().value(value).build().map_err(build_error)?,
                );
            }

            batch = batch.changes(
                types::Change::builder()
                    .action(action)
                    .resource_record_set(set.build().map_err(build_error)?)
                    .build()
                    .map_err(build_error)?,
            );
        }

        self.client
            .change_resource_record_sets()
            .hosted_zone_id(zone_id)
            .change_batch(batch.build().map_err(build_error)?)
            .send()
            .await
            .map_err(|e| sdk_error("change resource record sets", e))?;

        Ok(())
    }
}
