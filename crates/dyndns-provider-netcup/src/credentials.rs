//! netcup credential loading
//!
//! Credentials come from `NETCUP_CUSTOMER_NUMBER`, `NETCUP_API_KEY` and
//! `NETCUP_API_PASSWORD`. When any of them is missing, the credential file
//! (`~/.homeddns/netcup_credentials` by default) fills the gaps. Environment
//! values always win.
//!
//! File format:
//!
//! ```text
//! # netcup CCP API access
//! customer_number = 12345
//! api_key = ...
//! api_password = ...
//! ```

use dyndns_core::config::ProviderConfig;
use dyndns_core::mask::mask_value;
use dyndns_core::{Error, Result};
use std::path::{Path, PathBuf};

pub const ENV_CUSTOMER_NUMBER: &str = "NETCUP_CUSTOMER_NUMBER";
pub const ENV_API_KEY: &str = "NETCUP_API_KEY";
pub const ENV_API_PASSWORD: &str = "NETCUP_API_PASSWORD";
pub const ENV_ENDPOINT: &str = "NETCUP_ENDPOINT";

/// Credential file location relative to the home directory
const CREDENTIALS_FILE: &str = ".homeddns/netcup_credentials";

/// Long-lived netcup API credentials
#[derive(Clone, Default, PartialEq, Eq)]
pub struct NetcupCredentials {
    pub customer_number: Option<String>,
    pub api_key: Option<String>,
    pub api_password: Option<String>,
    pub endpoint: Option<String>,
}

impl std::fmt::Debug for NetcupCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetcupCredentials")
            .field(
                "customer_number",
                &self.customer_number.as_deref().map(mask_value),
            )
            .field("api_key", &self.api_key.as_ref().map(|_| "<REDACTED>"))
            .field(
                "api_password",
                &self.api_password.as_ref().map(|_| "<REDACTED>"),
            )
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl NetcupCredentials {
    /// Default credential file path (`$HOME/.homeddns/netcup_credentials`)
    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(CREDENTIALS_FILE))
    }

    /// Load credentials from the process environment, falling back to the
    /// default credential file
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok(), Self::default_path().as_deref())
    }

    /// Load credentials with an explicit environment lookup and file path
    ///
    /// The file is only read when the environment leaves a credential unset.
    /// A missing file is not an error; incomplete credentials are.
    pub fn load_with<F>(env: F, file: Option<&Path>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| env(key).filter(|value| !value.trim().is_empty());

        let mut credentials = Self {
            customer_number: lookup(ENV_CUSTOMER_NUMBER),
            api_key: lookup(ENV_API_KEY),
            api_password: lookup(ENV_API_PASSWORD),
            endpoint: lookup(ENV_ENDPOINT),
        };

        if !credentials.is_complete()
            && let Some(path) = file
        {
            match std::fs::read_to_string(path) {
                Ok(content) => {
                    tracing::debug!(path = %path.display(), "netcup: reading credential file");
                    credentials.fill_from(Self::parse(&content));
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!(path = %path.display(), "netcup: no credential file");
                }
                Err(e) => {
                    return Err(Error::config(format!(
                        "failed to read credential file {}: {e}",
                        path.display()
                    )));
                }
            }
        }

        if !credentials.is_complete() {
            return Err(Error::config(format!(
                "netcup credentials incomplete: set {ENV_CUSTOMER_NUMBER}, {ENV_API_KEY} and \
                 {ENV_API_PASSWORD} or provide ~/{CREDENTIALS_FILE}"
            )));
        }

        Ok(credentials)
    }

    /// Parse the `key = value` credential file format
    pub fn parse(content: &str) -> Self {
        let mut credentials = Self::default();

        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                tracing::warn!(line = index + 1, "netcup: ignoring malformed credential line");
                continue;
            };
            let value = value.trim().trim_matches('"').to_string();
            if value.is_empty() {
                continue;
            }

            match key.trim().to_ascii_lowercase().as_str() {
                "customer_number" => credentials.customer_number = Some(value),
                "api_key" => credentials.api_key = Some(value),
                "api_password" => credentials.api_password = Some(value),
                "endpoint" => credentials.endpoint = Some(value),
                other => {
                    tracing::warn!(line = index + 1, key = other, "netcup: ignoring unknown credential key");
                }
            }
        }

        credentials
    }

    fn fill_from(&mut self, other: Self) {
        self.customer_number = self.customer_number.take().or(other.customer_number);
        self.api_key = self.api_key.take().or(other.api_key);
        self.api_password = self.api_password.take().or(other.api_password);
        self.endpoint = self.endpoint.take().or(other.endpoint);
    }

    pub fn is_complete(&self) -> bool {
        self.customer_number.is_some() && self.api_key.is_some() && self.api_password.is_some()
    }

    /// Convert into a provider configuration
    pub fn into_config(self) -> Result<ProviderConfig> {
        match (self.customer_number, self.api_key, self.api_password) {
            (Some(customer_number), Some(api_key), Some(api_password)) => {
                Ok(ProviderConfig::NetcupCcp {
                    customer_number,
                    api_key,
                    api_password,
                    endpoint: self.endpoint,
                })
            }
            _ => Err(Error::config("netcup credentials incomplete")),
        }
    }
}
