//! Exchange rate provider port.
//!
//! This trait defines the interface for external rate services.
//! Implementations can be HTTP clients, mock providers, etc.

use std::collections::HashMap;

/// Error type for calls to external providers.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{provider} transport error: {message}")]
    Transport {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} returned HTTP {status}")]
    Status { provider: &'static str, status: u16 },

    #[error("{provider} sent a malformed response: {message}")]
    Malformed {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} rejected the request: {message}")]
    Rejected {
        provider: &'static str,
        message: String,
    },

    #[error("Missing API key for {0}")]
    MissingApiKey(&'static str),
}

/// Raw quotes as a provider returned them.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderQuotes {
    /// Base currency the provider answered in.
    pub base: String,
    /// Units of each currency per one unit of `base`.
    pub rates: HashMap<String, f64>,
}

/// Port trait for exchange rate providers.
#[async_trait::async_trait]
pub trait RateProvider: Send + Sync {
    /// Stable identifier, used in logs and configuration.
    fn id(&self) -> &'static str;

    /// Fetches the latest quotes relative to `base`.
    async fn fetch_latest(&self, base: &str) -> Result<ProviderQuotes, ProviderError>;
}
