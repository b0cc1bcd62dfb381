//! Process configuration from environment variables

use anyhow::{Context, Result};
use dyndns_core::{DEFAULT_TTL, ProviderConfig};
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

pub const DEFAULT_PORT: u16 = 8053;
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PROVIDER: &str = "netcup_ccp";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Daemon configuration
pub struct Config {
    pub port: u16,
    pub bind_address: String,
    pub auth_username: String,
    /// bcrypt hash; ⚠️ never log this value unmasked
    pub auth_password_hash: String,
    pub provider: String,
    pub ttl: u32,
    pub request_timeout_secs: u64,
    pub shutdown_timeout_secs: u64,
    pub log_level: String,
    pub aws_region: Option<String>,
    /// Lookup service for `update`; `None` picks one per address family
    pub public_ip_url: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("bind_address", &self.bind_address)
            .field("auth_username", &self.auth_username)
            .field(
                "auth_password_hash",
                &dyndns_core::mask::mask_sensitive(&self.auth_password_hash),
            )
            .field("provider", &self.provider)
            .field("ttl", &self.ttl)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("shutdown_timeout_secs", &self.shutdown_timeout_secs)
            .field("log_level", &self.log_level)
            .field("aws_region", &self.aws_region)
            .field("public_ip_url", &self.public_ip_url)
            .finish()
    }
}

fn parse_var<T>(env: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env(key) {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: '{value}'")),
        _ => Ok(default),
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an environment lookup function
    pub fn from_lookup<F>(env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            port: parse_var(&env, "PORT", DEFAULT_PORT)?,
            bind_address: non_empty("BIND_ADDRESS")
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            auth_username: non_empty("AUTH_USERNAME").unwrap_or_default(),
            auth_password_hash: non_empty("AUTH_PASSWORD_HASH").unwrap_or_default(),
            provider: non_empty("DNS_PROVIDER")
                .map(|p| p.trim().to_lowercase())
                .unwrap_or_else(|| DEFAULT_PROVIDER.to_string()),
            ttl: parse_var(&env, "DNS_TTL", DEFAULT_TTL)?,
            request_timeout_secs: parse_var(&env, "REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            shutdown_timeout_secs: parse_var(&env, "SHUTDOWN_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            log_level: non_empty("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            aws_region: non_empty("AWS_REGION"),
            public_ip_url: non_empty("PUBLIC_IP_URL"),
        })
    }

    /// Validate the settings every command needs
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("PORT must be between 1 and 65535");
        }

        if self.ttl == 0 {
            anyhow::bail!("DNS_TTL must be greater than 0");
        }

        for (key, value) in [
            ("REQUEST_TIMEOUT_SECS", self.request_timeout_secs),
            ("SHUTDOWN_TIMEOUT_SECS", self.shutdown_timeout_secs),
        ] {
            if !(1..=300).contains(&value) {
                anyhow::bail!("{key} must be between 1 and 300 seconds. Got: {value}");
            }
        }

        self.log_level()?;
        Ok(())
    }

    /// Validate the basic-auth settings the server requires
    pub fn validate_auth(&self) -> Result<()> {
        if self.auth_username.is_empty() {
            anyhow::bail!(
                "AUTH_USERNAME is required. \
                Set it via: export AUTH_USERNAME=router"
            );
        }

        if self.auth_password_hash.is_empty() {
            anyhow::bail!(
                "AUTH_PASSWORD_HASH is required. \
                Generate a bcrypt hash of the router password and export it"
            );
        }

        if !self.auth_password_hash.starts_with("$2") {
            anyhow::bail!(
                "AUTH_PASSWORD_HASH does not look like a bcrypt hash (expected prefix $2). \
                Plaintext passwords are not accepted."
            );
        }

        Ok(())
    }

    /// Parsed `LOG_LEVEL`
    pub fn log_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Build the configuration of the selected provider
    ///
    /// Names without built-in configuration become a `Custom` config, which
    /// the registry rejects unless a factory of that name is registered.
    pub fn provider_config(&self) -> Result<ProviderConfig> {
        match self.provider.as_str() {
            #[cfg(feature = "netcup")]
            "netcup_ccp" => dyndns_provider_netcup::NetcupCredentials::load()?
                .into_config()
                .map_err(Into::into),
            "aws_route53" => Ok(ProviderConfig::AwsRoute53 {
                region: self.aws_region.clone(),
            }),
            other => Ok(ProviderConfig::Custom {
                factory: other.to_string(),
                config: serde_json::json!({}),
            }),
        }
    }
}
