//! Primary rate provider: the keyless exchangerate-api.com endpoint.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use fx_types::{ProviderError, ProviderQuotes, RateProvider};

use crate::{fetch_json, http_client};

pub const PROVIDER_ID: &str = "exchangerate-api";

const DEFAULT_BASE_URL: &str = "https://api.exchangerate-api.com/v4";

#[derive(Debug, Deserialize)]
struct LatestResponse {
    base: Option<String>,
    rates: HashMap<String, f64>,
}

/// Fetches `GET {base_url}/latest/{BASE}`.
pub struct ExchangeRateApiProvider {
    client: reqwest::Client,
    base_url: String,
}

impl Default for ExchangeRateApiProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ExchangeRateApiProvider {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Points the provider at another host, e.g. a mock server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl RateProvider for ExchangeRateApiProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    #[instrument(skip(self))]
    async fn fetch_latest(&self, base: &str) -> Result<ProviderQuotes, ProviderError> {
        let url = format!("{}/latest/{}", self.base_url, base.to_ascii_uppercase());
        let body: LatestResponse = fetch_json(self.client.get(url), PROVIDER_ID).await?;

        tracing::debug!("{} returned {} rates", PROVIDER_ID, body.rates.len());
        Ok(ProviderQuotes {
            base: body.base.unwrap_or_else(|| base.to_ascii_uppercase()),
            rates: body.rates,
        })
    }
}
