//! Data Transfer Objects (DTOs) for requests and responses.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use exchange_rates::{Currency, FormatOptions, Locale, RateSnapshot};

// ─────────────────────────────────────────────────────────────────────────────
// Catalog DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// A supported currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CurrencyResponse {
    #[schema(example = "EUR")]
    pub code: String,
    #[schema(example = "Euro")]
    pub name: String,
    #[schema(example = "€")]
    pub symbol: String,
    pub flag: String,
    /// Fraction digits used when formatting
    #[schema(example = 2)]
    pub decimal_places: u8,
}

impl From<&Currency> for CurrencyResponse {
    fn from(currency: &Currency) -> Self {
        Self {
            code: currency.code.to_string(),
            name: currency.name.to_string(),
            symbol: currency.symbol.to_string(),
            flag: currency.flag.to_string(),
            decimal_places: currency.decimal_places,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rate DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Observable state of the rate store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RateStatus {
    /// A refresh is currently in flight
    pub is_loading: bool,
    /// The most recent refresh failed on every provider
    pub is_error: bool,
    /// When the current rates were captured; absent for built-in rates
    pub last_update: Option<DateTime<Utc>>,
    pub are_rates_stale: bool,
    #[schema(example = "USD")]
    pub base_currency: String,
    #[schema(example = "EUR")]
    pub preferred_currency: String,
}

/// The current rate snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RatesResponse {
    #[schema(example = "USD")]
    pub base: String,
    /// Units of each currency per one unit of `base`
    pub rates: BTreeMap<String, f64>,
    /// Capture time in epoch milliseconds
    pub timestamp: i64,
    pub stale: bool,
}

impl RatesResponse {
    pub fn new(snapshot: &RateSnapshot, stale: bool) -> Self {
        Self {
            base: snapshot.base().to_string(),
            rates: snapshot.rates().clone(),
            timestamp: snapshot.captured_at(),
            stale,
        }
    }
}

/// Outcome of an on-demand refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    /// Whether a provider supplied new rates
    pub refreshed: bool,
    pub status: RateStatus,
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversion DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Query for converting an amount.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConvertQuery {
    #[schema(example = 100.0)]
    pub amount: f64,
    /// Source currency; defaults to the base currency
    pub from: Option<String>,
    /// Target currency; defaults to the preferred currency
    pub to: Option<String>,
}

/// Result of a conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConvertResponse {
    pub amount: f64,
    #[schema(example = "USD")]
    pub from: String,
    #[schema(example = "EUR")]
    pub to: String,
    pub result: f64,
    /// `result` rendered in the target currency
    #[schema(example = "€92.00")]
    pub formatted: String,
}

/// Query for formatting an amount.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FormatQuery {
    #[schema(example = 29.99)]
    pub amount: f64,
    /// Currency code; defaults to the preferred currency
    pub currency: Option<String>,
    pub show_symbol: Option<bool>,
    pub show_code: Option<bool>,
    pub min_fraction_digits: Option<u8>,
    pub max_fraction_digits: Option<u8>,
    pub locale: Option<Locale>,
}

impl FormatQuery {
    /// Formatting options with unset fields left at their defaults.
    pub fn options(&self) -> FormatOptions {
        let defaults = FormatOptions::default();
        FormatOptions {
            show_symbol: self.show_symbol.unwrap_or(defaults.show_symbol),
            show_code: self.show_code.unwrap_or(defaults.show_code),
            minimum_fraction_digits: self.min_fraction_digits,
            maximum_fraction_digits: self.max_fraction_digits,
            locale: self.locale.unwrap_or(defaults.locale),
        }
    }
}

/// A formatted amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FormatResponse {
    #[schema(example = "$29.99")]
    pub formatted: String,
    #[schema(example = "USD")]
    pub currency: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Preference DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Currency guessed from the caller's location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DetectResponse {
    #[schema(example = "GBP")]
    pub currency: String,
}

/// The preferred display currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PreferenceResponse {
    #[schema(example = "EUR")]
    pub currency: String,
}

/// Request to change the preferred display currency.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SetPreferenceRequest {
    #[schema(example = "EUR")]
    pub currency: String,
}
