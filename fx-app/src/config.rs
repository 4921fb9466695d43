//! Configuration loading from environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, anyhow};
use fx_hex::worker::MAX_PERIOD;
use fx_providers::{ProviderKind, ProviderSettings};
use fx_types::RateStoreConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rates: RateStoreConfig,
    pub providers: ProviderSettings,
    pub cache_dir: PathBuf,
    /// `None` means the public ipapi.co endpoint.
    pub geolocation_url: Option<String>,
    pub rate_limit_per_minute: u32,
    /// Key the rate limiter on `X-Forwarded-For` instead of the peer address.
    pub trust_proxy: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match var("PORT") {
            Some(port) => port.parse().context("PORT must be a port number")?,
            None => 3000,
        };

        let base_currency = var("FX_BASE_CURRENCY")
            .unwrap_or_else(|| exchange_rates::DEFAULT_BASE_CURRENCY.to_string());
        if exchange_rates::find_currency(&base_currency).is_none() {
            return Err(anyhow!(
                "FX_BASE_CURRENCY {} is not a supported currency",
                base_currency
            ));
        }

        let interval_secs: u64 = match var("FX_REFRESH_INTERVAL_SECS") {
            Some(secs) => secs
                .parse()
                .context("FX_REFRESH_INTERVAL_SECS must be a whole number of seconds")?,
            None => 3600,
        };
        if interval_secs == 0 {
            return Err(anyhow!("FX_REFRESH_INTERVAL_SECS must be greater than zero"));
        }
        if interval_secs > MAX_PERIOD.as_secs() {
            return Err(anyhow!(
                "FX_REFRESH_INTERVAL_SECS must be at most {}",
                MAX_PERIOD.as_secs()
            ));
        }

        let mut providers = ProviderSettings::default();
        if let Some(list) = var("FX_PROVIDERS") {
            providers.order = list
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.parse::<ProviderKind>().map_err(|e| anyhow!(e)))
                .collect::<anyhow::Result<_>>()?;
        }
        providers.fixer_api_key = var("FIXER_API_KEY");

        let rate_limit_per_minute = match var("RATE_LIMIT_PER_MINUTE") {
            Some(limit) => limit
                .parse()
                .context("RATE_LIMIT_PER_MINUTE must be a whole number")?,
            None => 100,
        };

        let trust_proxy = match var("FX_TRUST_PROXY").as_deref() {
            Some("1") | Some("true") => true,
            Some("0") | Some("false") | None => false,
            Some(other) => {
                return Err(anyhow!("FX_TRUST_PROXY must be true or false, got {}", other));
            }
        };

        Ok(Self {
            port,
            rates: RateStoreConfig::new(&base_currency, Duration::from_secs(interval_secs)),
            providers,
            cache_dir: var("FX_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".fx-cache")),
            geolocation_url: var("FX_GEOLOCATION_URL"),
            rate_limit_per_minute,
            trust_proxy,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.rates.base_currency, "USD");
        assert_eq!(config.rates.refresh_interval, Duration::from_secs(3600));
        assert_eq!(config.providers, ProviderSettings::default());
        assert_eq!(config.cache_dir, PathBuf::from(".fx-cache"));
        assert_eq!(config.geolocation_url, None);
        assert_eq!(config.rate_limit_per_minute, 100);
        assert!(!config.trust_proxy);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("PORT", "8080"),
            ("FX_BASE_CURRENCY", "eur"),
            ("FX_REFRESH_INTERVAL_SECS", "60"),
            ("FX_PROVIDERS", "fixer"),
            ("FIXER_API_KEY", "secret"),
            ("FX_CACHE_DIR", "/tmp/fx"),
            ("FX_GEOLOCATION_URL", "http://localhost:9000/json/"),
            ("RATE_LIMIT_PER_MINUTE", "5"),
            ("FX_TRUST_PROXY", "true"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.rates.base_currency, "EUR");
        assert_eq!(config.rates.refresh_interval, Duration::from_secs(60));
        assert_eq!(config.providers.order, vec![ProviderKind::Fixer]);
        assert_eq!(config.providers.fixer_api_key.as_deref(), Some("secret"));
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/fx"));
        assert_eq!(
            config.geolocation_url.as_deref(),
            Some("http://localhost:9000/json/")
        );
        assert_eq!(config.rate_limit_per_minute, 5);
        assert!(config.trust_proxy);
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = load(&[("PORT", "  "), ("FIXER_API_KEY", "")]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.providers.fixer_api_key, None);
    }

    #[test]
    fn test_invalid_values() {
        assert!(load(&[("PORT", "http")]).is_err());
        assert!(load(&[("FX_BASE_CURRENCY", "XYZ")]).is_err());
        assert!(load(&[("FX_REFRESH_INTERVAL_SECS", "0")]).is_err());
        assert!(load(&[("FX_REFRESH_INTERVAL_SECS", "-5")]).is_err());
        assert!(load(&[("FX_REFRESH_INTERVAL_SECS", "18446744073709551615")]).is_err());
        assert!(load(&[("FX_REFRESH_INTERVAL_SECS", "31536001")]).is_err());
        assert!(load(&[("FX_TRUST_PROXY", "maybe")]).is_err());
        assert!(load(&[("FX_PROVIDERS", "exchangerate-api,oanda")]).is_err());
    }
}
