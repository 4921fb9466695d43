//! Immutable exchange-rate snapshots.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{DEFAULT_BASE_CURRENCY, fallback_rates};

/// Why a set of quotes could not become a snapshot.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SnapshotError {
    #[error("No usable rates in response")]
    Empty,

    #[error("Base currency {0} missing from rates")]
    MissingBase(String),

    #[error("Invalid rate for {0}")]
    InvalidRate(String),
}

/// A complete set of rates relative to one base currency.
///
/// `rates[base]` is always exactly `1.0`. Snapshots are built wholesale and
/// never mutated afterwards; a refresh replaces the whole value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateSnapshot {
    base: String,
    rates: BTreeMap<String, f64>,
    captured_at: i64,
}

impl RateSnapshot {
    /// Normalises quotes from a provider into a snapshot for `base`.
    ///
    /// Quotes that are not finite and positive are dropped. When the provider
    /// answered in a different base (`quoted_base`), every quote is divided by
    /// the quote for `base`.
    pub fn from_quotes<I>(
        base: &str,
        quoted_base: &str,
        quotes: I,
        captured_at: i64,
    ) -> Result<Self, SnapshotError>
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let base = base.to_ascii_uppercase();
        let mut rates: BTreeMap<String, f64> = quotes
            .into_iter()
            .filter(|(_, rate)| rate.is_finite() && *rate > 0.0)
            .map(|(code, rate)| (code.to_ascii_uppercase(), rate))
            .collect();

        if quoted_base.eq_ignore_ascii_case(&base) {
            rates.entry(base.clone()).or_insert(1.0);
        }

        let pivot = *rates
            .get(&base)
            .ok_or_else(|| SnapshotError::MissingBase(base.clone()))?;
        if pivot != 1.0 {
            for rate in rates.values_mut() {
                *rate /= pivot;
            }
        }
        rates.insert(base.clone(), 1.0);

        if rates.len() < 2 {
            return Err(SnapshotError::Empty);
        }

        Ok(Self {
            base,
            rates,
            captured_at,
        })
    }

    /// Rebuilds a snapshot from previously persisted rates, unchanged.
    pub fn restore(
        base: &str,
        rates: BTreeMap<String, f64>,
        captured_at: i64,
    ) -> Result<Self, SnapshotError> {
        let base = base.to_ascii_uppercase();
        match rates.get(&base) {
            Some(rate) if *rate == 1.0 => {}
            _ => return Err(SnapshotError::MissingBase(base)),
        }
        if let Some((code, _)) = rates.iter().find(|(_, r)| !r.is_finite() || **r <= 0.0) {
            return Err(SnapshotError::InvalidRate(code.clone()));
        }

        Ok(Self {
            base,
            rates,
            captured_at,
        })
    }

    /// The built-in table rebased onto `base`, captured at epoch zero.
    pub fn fallback(base: &str) -> Self {
        Self::from_quotes(base, DEFAULT_BASE_CURRENCY, fallback_rates(), 0).unwrap_or_else(|_| {
            // Unknown base: keep the dollar table and pin the base at 1.0.
            let mut rates: BTreeMap<String, f64> = fallback_rates().collect();
            let base = base.to_ascii_uppercase();
            rates.insert(base.clone(), 1.0);
            Self {
                base,
                rates,
                captured_at: 0,
            }
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn rates(&self) -> &BTreeMap<String, f64> {
        &self.rates
    }

    /// Epoch milliseconds at which the rates were captured.
    pub fn captured_at(&self) -> i64 {
        self.captured_at
    }

    /// Rate for a currency relative to the base, ignoring ASCII case.
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates
            .get(code)
            .or_else(|| self.rates.get(&code.to_ascii_uppercase()))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}
