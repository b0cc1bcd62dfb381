//! Core traits for the DynDNS bridge
//!
//! - [`DnsProvider`]: Upsert DNS records via a provider backend
//! - [`DnsProviderFactory`]: Build a provider from configuration

pub mod dns_provider;

pub use dns_provider::{DnsProvider, DnsProviderFactory};
