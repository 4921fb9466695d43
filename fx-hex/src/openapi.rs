//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use fx_types::dto::{
    ConvertQuery, ConvertResponse, CurrencyResponse, DetectResponse, FormatQuery, FormatResponse,
    PreferenceResponse, RateStatus, RatesResponse, RefreshResponse, SetPreferenceRequest,
};
use fx_types::{FormatOptions, Locale};
use utoipa::OpenApi;

// Dummy functions to generate path documentation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// List supported currencies
#[utoipa::path(
    get,
    path = "/api/currencies",
    tag = "currencies",
    responses(
        (status = 200, description = "All supported currencies", body = Vec<CurrencyResponse>)
    )
)]
async fn list_currencies() {}

/// Get one supported currency
#[utoipa::path(
    get,
    path = "/api/currencies/{code}",
    tag = "currencies",
    params(
        ("code" = String, Path, description = "ISO 4217 code, any case")
    ),
    responses(
        (status = 200, description = "Currency details", body = CurrencyResponse),
        (status = 400, description = "Malformed currency code"),
        (status = 404, description = "Currency not supported")
    )
)]
async fn get_currency() {}

/// Current rate snapshot
#[utoipa::path(
    get,
    path = "/api/rates",
    tag = "rates",
    responses(
        (status = 200, description = "Rates relative to the base currency", body = RatesResponse)
    )
)]
async fn get_rates() {}

/// Refresh rates from the providers now
#[utoipa::path(
    post,
    path = "/api/rates/refresh",
    tag = "rates",
    responses(
        (status = 200, description = "Refresh attempted; `refreshed` is false when every provider failed", body = RefreshResponse)
    )
)]
async fn refresh_rates() {}

/// Observable refresh state
#[utoipa::path(
    get,
    path = "/api/status",
    tag = "rates",
    responses(
        (status = 200, description = "Loading, error and staleness flags", body = RateStatus)
    )
)]
async fn get_status() {}

/// Convert an amount between currencies
#[utoipa::path(
    get,
    path = "/api/convert",
    tag = "conversion",
    params(ConvertQuery),
    responses(
        (status = 200, description = "Converted amount", body = ConvertResponse),
        (status = 400, description = "Non-finite amount or malformed currency code")
    )
)]
async fn convert() {}

/// Format an amount for display
#[utoipa::path(
    get,
    path = "/api/format",
    tag = "conversion",
    params(FormatQuery),
    responses(
        (status = 200, description = "Formatted amount", body = FormatResponse),
        (status = 400, description = "Non-finite amount or malformed currency code")
    )
)]
async fn format() {}

/// Guess the caller's currency from IP geolocation
#[utoipa::path(
    get,
    path = "/api/detect",
    tag = "preference",
    responses(
        (status = 200, description = "Detected currency, or the base currency", body = DetectResponse)
    )
)]
async fn detect() {}

/// Get the preferred display currency
#[utoipa::path(
    get,
    path = "/api/preference",
    tag = "preference",
    responses(
        (status = 200, description = "Preferred currency", body = PreferenceResponse)
    )
)]
async fn get_preference() {}

/// Change the preferred display currency
#[utoipa::path(
    put,
    path = "/api/preference",
    tag = "preference",
    request_body = SetPreferenceRequest,
    responses(
        (status = 200, description = "Preference stored", body = PreferenceResponse),
        (status = 400, description = "Unsupported or malformed currency code")
    )
)]
async fn set_preference() {}

/// OpenAPI documentation for the exchange-rate API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "FX Rates Service API",
        version = "1.0.0",
        description = "Currency catalog, exchange-rate snapshot, conversion and locale-aware formatting.\n\nRates are best effort: when every provider fails the last known (or built-in) rates keep being served.",
        license(name = "MIT"),
    ),
    paths(
        health,
        list_currencies,
        get_currency,
        get_rates,
        refresh_rates,
        get_status,
        convert,
        format,
        detect,
        get_preference,
        set_preference,
    ),
    components(
        schemas(
            CurrencyResponse,
            RatesResponse,
            RateStatus,
            RefreshResponse,
            ConvertResponse,
            FormatResponse,
            FormatOptions,
            Locale,
            DetectResponse,
            PreferenceResponse,
            SetPreferenceRequest,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "currencies", description = "Supported currency catalog"),
        (name = "rates", description = "Exchange-rate snapshot and refresh"),
        (name = "conversion", description = "Conversion and display formatting"),
        (name = "preference", description = "Preferred currency and detection"),
    )
)]
pub struct ApiDoc;
