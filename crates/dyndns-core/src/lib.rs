// # dyndns-core
//
// Core library for the DynDNS update bridge.
//
// ## Architecture Overview
//
// - **DnsRecord / RecordType**: transient value objects built per request
// - **DnsProvider**: trait every DNS backend implements (upsert semantics)
// - **ProviderRegistry**: name → factory lookup used to pick a backend at startup
// - **ProviderConfig**: serde-tagged backend configuration
//
// ## Design Principles
//
// 1. **Separation of Concerns**: protocol handling lives in `dyndns-server`,
//    backends live in their own crates, this crate only holds the contract
// 2. **Plugin-Based**: providers are registered by name, no hard-coded if-else
// 3. **Idempotency**: `update_record` never writes when the value already matches
// 4. **Self-contained backends**: sessions and caches are private to each provider

pub mod config;
pub mod error;
pub mod mask;
pub mod record;
pub mod registry;
pub mod traits;

// Re-export core types for convenience
pub use config::{DEFAULT_TTL, ProviderConfig};
pub use error::{Error, Result};
pub use record::{DnsRecord, RecordType, build_hostname, extract_subdomain};
pub use registry::ProviderRegistry;
pub use traits::{DnsProvider, DnsProviderFactory};
