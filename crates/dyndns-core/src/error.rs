//! Error types for the DynDNS bridge
//!
//! Provider internals wrap failures with enough context to diagnose them.
//! The protocol handler collapses every variant into a single `911` answer,
//! so the variants exist for logs and tests, not for the wire.

use thiserror::Error;

/// Result type alias for DynDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DynDNS bridge
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A backend answered with JSON of an unexpected shape
    #[error("JSON error ({context}): {source}")]
    Json {
        /// What was being decoded
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// HTTP client errors (from provider APIs)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Record or zone not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A provider call exceeded its deadline
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a JSON decoding error
    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error is the NotFound condition of `get_record`
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_distinguishable() {
        assert!(Error::not_found("www.example.com A").is_not_found());
        assert!(!Error::rate_limited("slow down").is_not_found());
        assert!(!Error::provider("netcup_ccp", "boom").is_not_found());
    }

    #[test]
    fn json_error_names_what_was_decoded() {
        let source = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        let err = Error::json("netcup login response", source);
        assert!(err.to_string().starts_with("JSON error (netcup login response): "));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn provider_error_carries_context() {
        let err = Error::provider("netcup_ccp", "login request: unexpected status code: 500");
        assert_eq!(
            err.to_string(),
            "Provider error (netcup_ccp): login request: unexpected status code: 500"
        );
    }
}
