//! Rate store configuration.

use std::time::Duration;

use exchange_rates::DEFAULT_BASE_CURRENCY;

/// Default time between refreshes: one hour.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Settings for the rate store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateStoreConfig {
    /// Currency every rate is expressed against.
    pub base_currency: String,
    /// Age after which a snapshot counts as stale and the timer period.
    pub refresh_interval: Duration,
}

impl Default for RateStoreConfig {
    fn default() -> Self {
        Self {
            base_currency: DEFAULT_BASE_CURRENCY.to_string(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }
}

impl RateStoreConfig {
    pub fn new(base_currency: impl Into<String>, refresh_interval: Duration) -> Self {
        Self {
            base_currency: base_currency.into().to_ascii_uppercase(),
            refresh_interval,
        }
    }

    /// Refresh interval in milliseconds, saturating at `i64::MAX`.
    pub fn refresh_interval_millis(&self) -> i64 {
        i64::try_from(self.refresh_interval.as_millis()).unwrap_or(i64::MAX)
    }
}
