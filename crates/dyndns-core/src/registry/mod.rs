//! Plugin-based provider registry
//!
//! The registry maps a provider name to a factory, so the daemon can select
//! a backend at startup without a hardcoded if-else chain.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dyndns_core::registry::ProviderRegistry;
//! use dyndns_core::config::ProviderConfig;
//!
//! let registry = ProviderRegistry::new();
//! dyndns_provider_netcup::register(&registry)?;
//!
//! let config = ProviderConfig::NetcupCcp { .. };
//! let provider = registry.create_provider(&config).await?;
//! ```
//!
//! ## Registration
//!
//! Backend crates register themselves once, before first use:
//!
//! ```rust,ignore
//! pub fn register(registry: &ProviderRegistry) -> dyndns_core::Result<()> {
//!     registry.register_provider("netcup_ccp", Box::new(NetcupFactory))
//! }
//! ```

use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::traits::{DnsProvider, DnsProviderFactory};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Provider registry for plugin-based DNS provider creation
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ProviderRegistry {
    /// Registered DNS provider factories
    providers: RwLock<HashMap<String, Arc<dyn DnsProviderFactory>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a DNS provider factory
    ///
    /// # Parameters
    ///
    /// - `name`: Provider type name (e.g., "netcup_ccp", "aws_route53")
    /// - `factory`: Factory object for creating provider instances
    ///
    /// # Errors
    ///
    /// Fails when a factory is already registered under `name`.
    pub fn register_provider(
        &self,
        name: impl Into<String>,
        factory: Box<dyn DnsProviderFactory>,
    ) -> Result<()> {
        let name = name.into();
        let mut providers = self
            .providers
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if providers.contains_key(&name) {
            return Err(Error::config(format!(
                "provider factory already registered: {name}"
            )));
        }

        tracing::debug!(provider = %name, "Registered provider factory");
        providers.insert(name, Arc::from(factory));
        Ok(())
    }

    /// Create a DNS provider from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn DnsProvider>)`: Created provider instance
    /// - `Err(Error)`: If provider type is not registered or creation fails
    pub async fn create_provider(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        let provider_type = config.type_name();

        let factory = {
            let providers = self
                .providers
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            providers
                .get(provider_type)
                .cloned()
                .ok_or_else(|| Error::config(format!("provider not found: {provider_type}")))?
        };

        // Lock is released before the async factory runs
        factory.create(config).await
    }

    /// List all registered provider types, sorted alphabetically
    pub fn list_providers(&self) -> Vec<String> {
        let providers = self
            .providers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = providers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a provider type is registered
    pub fn has_provider(&self, name: &str) -> bool {
        let providers = self
            .providers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        providers.contains_key(name)
    }
}
