//! Provider configuration types
//!
//! Process-level settings (listen port, auth, timeouts) live in the daemon.
//! This module only describes how to build a provider.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default TTL applied to upserted records (seconds)
pub const DEFAULT_TTL: u32 = 60;

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// netcup CCP API (session-authenticated)
    NetcupCcp {
        /// netcup customer number
        customer_number: String,
        /// API key
        api_key: String,
        /// API password
        api_password: String,
        /// Endpoint override (defaults to the production CCP endpoint)
        #[serde(default)]
        endpoint: Option<String>,
    },

    /// AWS Route53 (credentials from the default AWS chain)
    AwsRoute53 {
        /// Region override
        #[serde(default)]
        region: Option<String>,
    },

    /// Custom provider
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::NetcupCcp {
                customer_number,
                api_key,
                api_password,
                endpoint,
            } => {
                if customer_number.is_empty() || api_key.is_empty() || api_password.is_empty() {
                    return Err(crate::Error::config(
                        "netcup customer number, API key and API password are required",
                    ));
                }
                if let Some(endpoint) = endpoint
                    && !endpoint.starts_with("https://")
                    && !endpoint.starts_with("http://")
                {
                    return Err(crate::Error::config(format!(
                        "netcup endpoint must use HTTP or HTTPS scheme. Got: {endpoint}"
                    )));
                }
                Ok(())
            }
            ProviderConfig::AwsRoute53 { region } => {
                if region.as_ref().is_some_and(|r| r.trim().is_empty()) {
                    return Err(crate::Error::config("AWS region cannot be empty when set"));
                }
                Ok(())
            }
            ProviderConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom provider factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom provider config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name used for registry lookup
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::NetcupCcp { .. } => "netcup_ccp",
            ProviderConfig::AwsRoute53 { .. } => "aws_route53",
            ProviderConfig::Custom { factory, .. } => factory,
        }
    }
}

// Credentials stay out of Debug output
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderConfig::NetcupCcp {
                customer_number,
                endpoint,
                ..
            } => f
                .debug_struct("NetcupCcp")
                .field("customer_number", &crate::mask::mask_value(customer_number))
                .field("api_key", &"<REDACTED>")
                .field("api_password", &"<REDACTED>")
                .field("endpoint", endpoint)
                .finish(),
            ProviderConfig::AwsRoute53 { region } => f
                .debug_struct("AwsRoute53")
                .field("region", region)
                .finish(),
            ProviderConfig::Custom { factory, .. } => f
                .debug_struct("Custom")
                .field("factory", factory)
                .field("config", &"<REDACTED>")
                .finish(),
        }
    }
}
