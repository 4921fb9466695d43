//! Fallback rate provider: fixer.io, which needs an access key.
//!
//! The free plan only answers in EUR regardless of the requested base; the
//! store rebases such answers, so the `base` echoed here is passed through.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use fx_types::{ProviderError, ProviderQuotes, RateProvider};

use crate::{fetch_json, http_client};

pub const PROVIDER_ID: &str = "fixer";

const DEFAULT_BASE_URL: &str = "https://data.fixer.io/api";

#[derive(Debug, Deserialize)]
struct LatestResponse {
    success: bool,
    base: Option<String>,
    rates: Option<HashMap<String, f64>>,
    error: Option<FixerError>,
}

#[derive(Debug, Deserialize)]
struct FixerError {
    code: Option<u16>,
    info: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

impl FixerError {
    fn describe(&self) -> String {
        let detail = self
            .info
            .as_deref()
            .or(self.kind.as_deref())
            .unwrap_or("unknown error");
        match self.code {
            Some(code) => format!("{} ({})", detail, code),
            None => detail.to_string(),
        }
    }
}

/// Fetches `GET {base_url}/latest?access_key=KEY&base=BASE`.
pub struct FixerProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl FixerProvider {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    /// Points the provider at another host, e.g. a mock server.
    pub fn with_base_url(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }
}

#[async_trait]
impl RateProvider for FixerProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    #[instrument(skip(self))]
    async fn fetch_latest(&self, base: &str) -> Result<ProviderQuotes, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingApiKey(PROVIDER_ID))?;

        let base = base.to_ascii_uppercase();
        let request = self
            .client
            .get(format!("{}/latest", self.base_url))
            .query(&[("access_key", api_key), ("base", base.as_str())]);
        let body: LatestResponse = fetch_json(request, PROVIDER_ID).await?;

        if !body.success {
            let message = body
                .error
                .map(|e| e.describe())
                .unwrap_or_else(|| "success flag was false".to_string());
            return Err(ProviderError::Rejected {
                provider: PROVIDER_ID,
                message,
            });
        }

        let rates = body.rates.ok_or_else(|| ProviderError::Malformed {
            provider: PROVIDER_ID,
            message: "missing rates".to_string(),
        })?;

        tracing::debug!("{} returned {} rates", PROVIDER_ID, rates.len());
        Ok(ProviderQuotes {
            base: body.base.unwrap_or_else(|| base.to_ascii_uppercase()),
            rates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        // Unroutable host: a request would surface as a transport error instead.
        let provider = FixerProvider::with_base_url("http://127.0.0.1:9", None);
        let result = provider.fetch_latest("USD").await;
        assert!(matches!(result, Err(ProviderError::MissingApiKey("fixer"))));
    }

    #[tokio::test]
    async fn test_blank_key_counts_as_missing() {
        let provider = FixerProvider::with_base_url("http://127.0.0.1:9", Some("  ".into()));
        let result = provider.fetch_latest("USD").await;
        assert!(matches!(result, Err(ProviderError::MissingApiKey(_))));
    }

    #[test]
    fn test_error_description() {
        let err = FixerError {
            code: Some(101),
            info: Some("invalid access key".into()),
            kind: Some("invalid_access_key".into()),
        };
        assert_eq!(err.describe(), "invalid access key (101)");
    }
}
