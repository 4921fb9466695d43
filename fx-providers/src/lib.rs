//! # FX Providers
//!
//! Concrete adapters for the exchange-rate service ports:
//! - rate providers (`RateProvider`) backed by external HTTP services
//! - an IP geolocation client (`GeoLocator`)
//! - key-value stores (`KeyValueStore`) on disk or in memory

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use fx_types::{ProviderError, RateProvider};
use serde::de::DeserializeOwned;

pub mod exchangerate_api;
pub mod file_store;
pub mod fixer;
pub mod ipapi;
pub mod memory_store;

pub use exchangerate_api::ExchangeRateApiProvider;
pub use file_store::FileStore;
pub use fixer::FixerProvider;
pub use ipapi::IpApiLocator;
pub use memory_store::MemoryStore;

/// Default HTTP request timeout for every outbound call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The rate services this crate can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    ExchangeRateApi,
    Fixer,
}

impl ProviderKind {
    pub fn id(&self) -> &'static str {
        match self {
            ProviderKind::ExchangeRateApi => exchangerate_api::PROVIDER_ID,
            ProviderKind::Fixer => fixer::PROVIDER_ID,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for ProviderKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exchangerate-api" | "exchangerate" => Ok(ProviderKind::ExchangeRateApi),
            "fixer" => Ok(ProviderKind::Fixer),
            _ => Err(format!("Unknown rate provider: {}", s)),
        }
    }
}

/// Ordered provider list plus the credentials they need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    /// Tried in this order on every refresh.
    pub order: Vec<ProviderKind>,
    pub fixer_api_key: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            order: vec![ProviderKind::ExchangeRateApi, ProviderKind::Fixer],
            fixer_api_key: None,
        }
    }
}

/// Builds the provider chain in the configured order.
///
/// A provider whose credentials are missing is still included; it fails
/// on every call so the chain moves on to the next one.
pub fn build_providers(settings: &ProviderSettings) -> Vec<Arc<dyn RateProvider>> {
    settings
        .order
        .iter()
        .map(|kind| -> Arc<dyn RateProvider> {
            match kind {
                ProviderKind::ExchangeRateApi => Arc::new(ExchangeRateApiProvider::new()),
                ProviderKind::Fixer => {
                    Arc::new(FixerProvider::new(settings.fixer_api_key.clone()))
                }
            }
        })
        .collect()
}

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// GETs `url` and decodes a JSON body, mapping every failure to `ProviderError`.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    provider: &'static str,
) -> Result<T, ProviderError> {
    // The URL may carry an API key
    let transport = |e: reqwest::Error| ProviderError::Transport {
        provider,
        message: e.without_url().to_string(),
    };

    let resp = request.send().await.map_err(transport)?;
    let status = resp.status();
    if !status.is_success() {
        return Err(ProviderError::Status {
            provider,
            status: status.as_u16(),
        });
    }

    let body = resp.text().await.map_err(transport)?;
    serde_json::from_str(&body).map_err(|e| ProviderError::Malformed {
        provider,
        message: e.to_string(),
    })
}
