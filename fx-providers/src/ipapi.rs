//! IP geolocation through ipapi.co.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use fx_types::{GeoLocator, ProviderError};

use crate::{fetch_json, http_client};

pub const PROVIDER_ID: &str = "ipapi";

const DEFAULT_URL: &str = "https://ipapi.co/json/";

#[derive(Debug, Deserialize)]
struct LookupResponse {
    country_code: Option<String>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

/// Looks up the country of the calling host.
pub struct IpApiLocator {
    client: reqwest::Client,
    url: String,
}

impl Default for IpApiLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IpApiLocator {
    pub fn new() -> Self {
        Self::with_url(DEFAULT_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl GeoLocator for IpApiLocator {
    #[instrument(skip(self))]
    async fn country_code(&self) -> Result<String, ProviderError> {
        let body: LookupResponse = fetch_json(self.client.get(&self.url), PROVIDER_ID).await?;

        if body.error {
            return Err(ProviderError::Rejected {
                provider: PROVIDER_ID,
                message: body.reason.unwrap_or_else(|| "lookup failed".to_string()),
            });
        }

        body.country_code
            .map(|code| code.trim().to_ascii_uppercase())
            .filter(|code| !code.is_empty())
            .ok_or_else(|| ProviderError::Malformed {
                provider: PROVIDER_ID,
                message: "missing country_code".to_string(),
            })
    }
}
