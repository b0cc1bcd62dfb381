use crate::auth::BasicAuth;
use dyndns_core::DEFAULT_TTL;
use dyndns_core::traits::DnsProvider;
use std::sync::Arc;
use std::time::Duration;

/// Default upper bound for the provider calls of one request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared application state passed to every handler
pub struct AppState {
    /// The single active provider, shared by all requests
    pub provider: Arc<dyn DnsProvider>,
    /// TTL applied to upserted records
    pub ttl: u32,
    /// Deadline for each provider call made for a request
    pub request_timeout: Duration,
    /// Basic-auth gate; `None` leaves the update endpoints open
    pub auth: Option<BasicAuth>,
}

impl AppState {
    pub fn new(provider: Arc<dyn DnsProvider>) -> Self {
        Self {
            provider,
            ttl: DEFAULT_TTL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            auth: None,
        }
    }

    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_auth(mut self, auth: BasicAuth) -> Self {
        self.auth = Some(auth);
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("provider", &self.provider.name())
            .field("ttl", &self.ttl)
            .field("request_timeout", &self.request_timeout)
            .field("auth", &self.auth)
            .finish()
    }
}
