//! # FX Client SDK
//!
//! A typed Rust client for the exchange-rate API.

use fx_types::{
    ConvertQuery, ConvertResponse, CurrencyResponse, DetectResponse, FormatQuery, FormatResponse,
    PreferenceResponse, RateStatus, RatesResponse, RefreshResponse, SetPreferenceRequest,
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Exchange-rate API client.
pub struct FxClient {
    base_url: String,
    http: Client,
}

impl FxClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self.http.get(self.url("/health")).send().await?;
        Ok(resp.status().is_success())
    }

    /// Lists every supported currency.
    pub async fn currencies(&self) -> Result<Vec<CurrencyResponse>, ClientError> {
        self.send(self.http.get(self.url("/api/currencies"))).await
    }

    /// Gets one currency by code.
    pub async fn currency(&self, code: &str) -> Result<CurrencyResponse, ClientError> {
        let path = format!("/api/currencies/{}", code);
        self.send(self.http.get(self.url(&path))).await
    }

    /// Gets the current rate snapshot.
    pub async fn rates(&self) -> Result<RatesResponse, ClientError> {
        self.send(self.http.get(self.url("/api/rates"))).await
    }

    pub async fn status(&self) -> Result<RateStatus, ClientError> {
        self.send(self.http.get(self.url("/api/status"))).await
    }

    /// Asks the server to refresh its rates now.
    pub async fn refresh(&self) -> Result<RefreshResponse, ClientError> {
        self.send(self.http.post(self.url("/api/rates/refresh"))).await
    }

    /// Converts `amount`; omitted currencies use the server defaults.
    pub async fn convert(
        &self,
        amount: f64,
        from: Option<String>,
        to: Option<String>,
    ) -> Result<ConvertResponse, ClientError> {
        let query = ConvertQuery { amount, from, to };
        self.send(self.http.get(self.url("/api/convert")).query(&query))
            .await
    }

    /// Formats an amount for display.
    pub async fn format(&self, query: &FormatQuery) -> Result<FormatResponse, ClientError> {
        self.send(self.http.get(self.url("/api/format")).query(query))
            .await
    }

    /// Guesses the currency for the server's location.
    pub async fn detect(&self) -> Result<DetectResponse, ClientError> {
        self.send(self.http.get(self.url("/api/detect"))).await
    }

    pub async fn preference(&self) -> Result<PreferenceResponse, ClientError> {
        self.send(self.http.get(self.url("/api/preference"))).await
    }

    /// Changes the preferred display currency.
    pub async fn set_preference(&self, currency: &str) -> Result<PreferenceResponse, ClientError> {
        let req = SetPreferenceRequest {
            currency: currency.to_string(),
        };
        self.send(self.http.put(self.url("/api/preference")).json(&req))
            .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(ClientError::Api {
                status: status.as_u16(),
                message: error_message(body),
            })
        }
    }
}

/// Pulls `error` out of a JSON error body, or returns the body as is.
fn error_message(body: String) -> String {
    serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or(body)
}
