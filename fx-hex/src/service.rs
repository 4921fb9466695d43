//! Currency Application Service
//!
//! The consumer-facing API: conversion and formatting against the rate
//! store's current snapshot, the preferred display currency, and the
//! observable refresh state. Contains NO infrastructure logic.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::DateTime;
use tracing::{info, warn};

use exchange_rates::{
    Currency, FormatOptions, RateSnapshot, convert, find_currency, format,
};
use fx_types::{
    AppError, ConvertQuery, ConvertResponse, FormatQuery, FormatResponse, KeyValueStore,
    RateStatus, RatesResponse,
};

use crate::RateStore;

/// Store key of the preferred display currency.
pub const PREFERENCE_KEY: &str = "preferred_currency";

/// Application service for currency operations.
///
/// Generic over `S: KeyValueStore` - the same store backs the rate cache
/// and the preference.
pub struct CurrencyService<S: KeyValueStore> {
    rates: Arc<RateStore<S>>,
    preferred: RwLock<String>,
}

impl<S: KeyValueStore> CurrencyService<S> {
    /// Creates the service; the preferred currency starts as the base currency.
    pub fn new(rates: Arc<RateStore<S>>) -> Self {
        let preferred = RwLock::new(rates.base_currency().to_string());
        Self { rates, preferred }
    }

    /// Returns the shared rate store.
    pub fn rates(&self) -> &Arc<RateStore<S>> {
        &self.rates
    }

    pub fn base_currency(&self) -> &str {
        self.rates.base_currency()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Preferred Currency
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn preferred_currency(&self) -> String {
        self.preferred
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Loads the persisted preference, ignoring anything not in the catalog.
    pub async fn restore_preference(&self) -> Option<String> {
        let stored = match self.rates.store().get(PREFERENCE_KEY).await {
            Ok(stored) => stored?,
            Err(e) => {
                warn!("Failed to read preferred currency: {}", e);
                return None;
            }
        };

        let Some(currency) = find_currency(stored.trim()) else {
            warn!(stored = %stored, "Ignoring unsupported preferred currency");
            return None;
        };
        self.set_preferred(currency.code);
        Some(currency.code.to_string())
    }

    /// Changes the preferred currency and persists it (best effort).
    pub async fn set_preferred_currency(&self, code: &str) -> Result<String, AppError> {
        let currency = self.currency(code).map_err(|e| match e {
            AppError::NotFound(msg) => AppError::BadRequest(msg),
            other => other,
        })?;
        self.set_preferred(currency.code);

        if let Err(e) = self
            .rates
            .store()
            .set(PREFERENCE_KEY, currency.code.to_string())
            .await
        {
            warn!("Failed to persist preferred currency: {}", e);
        }

        info!(currency = currency.code, "Preferred currency changed");
        Ok(currency.code.to_string())
    }

    fn set_preferred(&self, code: &str) {
        *self
            .preferred
            .write()
            .unwrap_or_else(PoisonError::into_inner) = code.to_string();
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Catalog
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn supported_currencies(&self) -> &'static [Currency] {
        exchange_rates::supported_currencies()
    }

    /// Looks up a supported currency.
    pub fn currency(&self, code: &str) -> Result<&'static Currency, AppError> {
        let code = normalize_code(code)?;
        find_currency(&code)
            .ok_or_else(|| AppError::NotFound(format!("Unsupported currency: {}", code)))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Conversion & Formatting
    // ─────────────────────────────────────────────────────────────────────────────

    /// Converts `amount`; `from` defaults to the base currency and `to` to the
    /// preferred currency. Missing rates count as 1.0.
    pub fn convert(&self, amount: f64, from: Option<&str>, to: Option<&str>) -> f64 {
        let preferred = self.preferred_currency();
        let from = from.unwrap_or(self.base_currency());
        let to = to.unwrap_or(&preferred);

        let snapshot = self.rates.snapshot();
        for code in missing_rates(from, to, &snapshot) {
            warn!(currency = code, "No exchange rate, treating it as 1.0");
        }
        convert(amount, from, to, &snapshot)
    }

    /// Formats `amount`; `code` defaults to the preferred currency.
    pub fn format(&self, amount: f64, code: Option<&str>, options: &FormatOptions) -> String {
        match code {
            Some(code) => format(amount, code, options),
            None => format(amount, &self.preferred_currency(), options),
        }
    }

    /// Validated conversion for API callers.
    pub fn convert_query(&self, query: &ConvertQuery) -> Result<ConvertResponse, AppError> {
        let amount = finite_amount(query.amount)?;
        let from = match &query.from {
            Some(code) => normalize_code(code)?,
            None => self.base_currency().to_string(),
        };
        let to = match &query.to {
            Some(code) => normalize_code(code)?,
            None => self.preferred_currency(),
        };

        let result = self.convert(amount, Some(&from), Some(&to));
        let formatted = format(result, &to, &FormatOptions::default());
        Ok(ConvertResponse {
            amount,
            from,
            to,
            result,
            formatted,
        })
    }

    /// Validated formatting for API callers.
    pub fn format_query(&self, query: &FormatQuery) -> Result<FormatResponse, AppError> {
        let amount = finite_amount(query.amount)?;
        let currency = match &query.currency {
            Some(code) => normalize_code(code)?,
            None => self.preferred_currency(),
        };

        Ok(FormatResponse {
            formatted: format(amount, &currency, &query.options()),
            currency,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Rates
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn refresh_rates(&self) -> bool {
        self.rates.refresh().await
    }

    pub async fn detect_user_currency(&self) -> String {
        self.rates.detect_user_currency().await
    }

    pub fn rates_response(&self) -> RatesResponse {
        RatesResponse::new(&self.rates.snapshot(), self.rates.is_stale())
    }

    /// Snapshot of the observable state.
    pub fn status(&self) -> RateStatus {
        let last_update = match self.rates.last_update() {
            0 => None,
            millis => DateTime::from_timestamp_millis(millis),
        };

        RateStatus {
            is_loading: self.rates.is_loading(),
            is_error: self.rates.is_error(),
            last_update,
            are_rates_stale: self.rates.is_stale(),
            base_currency: self.base_currency().to_string(),
            preferred_currency: self.preferred_currency(),
        }
    }
}

/// Accepts three ASCII letters, returned upper-cased.
fn normalize_code(code: &str) -> Result<String, AppError> {
    let code = code.trim();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::BadRequest(format!(
            "Invalid currency code: {:?}",
            code
        )));
    }
    Ok(code.to_ascii_uppercase())
}

/// Codes whose rate `convert` will substitute with 1.0. A same-currency
/// conversion uses no rate at all.
pub(crate) fn missing_rates<'a>(
    from: &'a str,
    to: &'a str,
    snapshot: &RateSnapshot,
) -> Vec<&'a str> {
    if from.eq_ignore_ascii_case(to) {
        return Vec::new();
    }
    [from, to]
        .into_iter()
        .filter(|code| snapshot.rate(code).is_none())
        .collect()
}

fn finite_amount(amount: f64) -> Result<f64, AppError> {
    if amount.is_finite() {
        Ok(amount)
    } else {
        Err(AppError::BadRequest("Amount must be a finite number".into()))
    }
}
