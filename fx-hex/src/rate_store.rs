//! Rate Store
//!
//! Owns the current exchange-rate snapshot. The snapshot starts as the
//! built-in fallback table, may be replaced from the local cache at startup,
//! and is replaced wholesale by every successful refresh.
//!
//! Nothing here returns an error to the caller: provider, cache and
//! geolocation failures are logged and degrade to "keep what we have".

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use exchange_rates::{RateSnapshot, SnapshotError, currency_for_country, find_currency};
use fx_types::{
    CachedRates, GeoLocator, KeyValueStore, ProviderError, RateProvider, RateStoreConfig,
    StoreError,
};

/// Store key of the persisted snapshot.
pub const RATES_CACHE_KEY: &str = "exchange_rates_cache";

#[derive(Debug, thiserror::Error)]
enum CacheError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("undecodable cache entry: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

#[derive(Debug, thiserror::Error)]
enum RefreshError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Current epoch time in milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Keeps the in-flight counter accurate even if a refresh future is dropped.
struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn new(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Best-effort view of exchange rates relative to one base currency.
///
/// Generic over `S: KeyValueStore` - the cache backend is injected.
/// Providers and the geolocator are trait objects because the provider
/// chain mixes implementations.
pub struct RateStore<S: KeyValueStore> {
    config: RateStoreConfig,
    providers: Vec<Arc<dyn RateProvider>>,
    geolocator: Arc<dyn GeoLocator>,
    store: S,
    snapshot: RwLock<Arc<RateSnapshot>>,
    in_flight: AtomicUsize,
    last_refresh_failed: AtomicBool,
}

impl<S: KeyValueStore> RateStore<S> {
    /// Creates a store holding the fallback rates. Call [`initialize`](Self::initialize)
    /// to pick up cached rates.
    pub fn new(
        config: RateStoreConfig,
        providers: Vec<Arc<dyn RateProvider>>,
        geolocator: Arc<dyn GeoLocator>,
        store: S,
    ) -> Self {
        let snapshot = RateSnapshot::fallback(&config.base_currency);
        Self {
            config,
            providers,
            geolocator,
            store,
            snapshot: RwLock::new(Arc::new(snapshot)),
            in_flight: AtomicUsize::new(0),
            last_refresh_failed: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &RateStoreConfig {
        &self.config
    }

    pub fn base_currency(&self) -> &str {
        &self.config.base_currency
    }

    pub fn refresh_interval(&self) -> Duration {
        self.config.refresh_interval
    }

    /// Returns a reference to the underlying key-value store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Identifiers of the configured providers, in fallback order.
    pub fn provider_ids(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Snapshot Access
    // ─────────────────────────────────────────────────────────────────────────────

    /// The current snapshot. Never waits on the network.
    pub fn snapshot(&self) -> Arc<RateSnapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace(&self, snapshot: Arc<RateSnapshot>) {
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = snapshot;
    }

    /// Capture time of the current snapshot, in epoch milliseconds.
    pub fn last_update(&self) -> i64 {
        self.snapshot().captured_at()
    }

    pub fn is_stale(&self) -> bool {
        self.is_stale_at(now_millis())
    }

    /// Stale once the snapshot is strictly older than the refresh interval.
    pub fn is_stale_at(&self, now_millis: i64) -> bool {
        now_millis.saturating_sub(self.last_update()) > self.config.refresh_interval_millis()
    }

    /// True while at least one refresh is in flight.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// True when the most recent refresh got nothing from any provider.
    pub fn is_error(&self) -> bool {
        self.last_refresh_failed.load(Ordering::SeqCst)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Cache
    // ─────────────────────────────────────────────────────────────────────────────

    /// Adopts cached rates if they are younger than the refresh interval.
    ///
    /// Returns whether the cache was used. An expired entry stays in the store.
    #[instrument(skip(self), fields(base = %self.config.base_currency))]
    pub async fn initialize(&self) -> bool {
        match self.load_cached(now_millis()).await {
            Ok(Some(snapshot)) => {
                info!(
                    captured_at = snapshot.captured_at(),
                    rates = snapshot.len(),
                    "Using cached exchange rates"
                );
                self.replace(Arc::new(snapshot));
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!("Ignoring cached exchange rates: {}", e);
                false
            }
        }
    }

    async fn load_cached(&self, now: i64) -> Result<Option<RateSnapshot>, CacheError> {
        let Some(raw) = self.store.get(RATES_CACHE_KEY).await? else {
            debug!("No cached exchange rates");
            return Ok(None);
        };

        let cached: CachedRates = serde_json::from_str(&raw)?;
        if now.saturating_sub(cached.timestamp) > self.config.refresh_interval_millis() {
            debug!(timestamp = cached.timestamp, "Cached exchange rates expired");
            return Ok(None);
        }

        Ok(Some(cached.into_snapshot(&self.config.base_currency)?))
    }

    async fn persist(&self, snapshot: &RateSnapshot) {
        let entry = CachedRates::from(snapshot);
        let result = match serde_json::to_string(&entry) {
            Ok(json) => self.store.set(RATES_CACHE_KEY, json).await.map_err(CacheError::from),
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            warn!("Failed to persist exchange rates: {}", e);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Refresh
    // ─────────────────────────────────────────────────────────────────────────────

    /// Tries each provider in order and swaps in the first complete snapshot.
    ///
    /// Returns `false`, leaving the current snapshot untouched, when every
    /// provider fails.
    #[instrument(skip(self), fields(base = %self.config.base_currency))]
    pub async fn refresh(&self) -> bool {
        let _loading = LoadingGuard::new(&self.in_flight);

        for provider in &self.providers {
            match self.fetch_from(provider.as_ref()).await {
                Ok(snapshot) => {
                    let snapshot = Arc::new(snapshot);
                    self.replace(snapshot.clone());
                    self.last_refresh_failed.store(false, Ordering::SeqCst);
                    info!(
                        provider = provider.id(),
                        rates = snapshot.len(),
                        "Exchange rates refreshed"
                    );
                    self.persist(&snapshot).await;
                    return true;
                }
                Err(e) => warn!(provider = provider.id(), "Rate provider failed: {}", e),
            }
        }

        self.last_refresh_failed.store(true, Ordering::SeqCst);
        warn!("All rate providers failed, keeping current rates");
        false
    }

    async fn fetch_from(&self, provider: &dyn RateProvider) -> Result<RateSnapshot, RefreshError> {
        let base = &self.config.base_currency;
        let quotes = provider.fetch_latest(base).await?;
        let snapshot = RateSnapshot::from_quotes(base, &quotes.base, quotes.rates, now_millis())?;
        Ok(snapshot)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Geolocation
    // ─────────────────────────────────────────────────────────────────────────────

    /// Guesses the caller's currency from its IP location.
    ///
    /// Falls back to the base currency on any failure or unknown country.
    #[instrument(skip(self))]
    pub async fn detect_user_currency(&self) -> String {
        let base = self.config.base_currency.clone();

        let country = match self.geolocator.country_code().await {
            Ok(country) => country,
            Err(e) => {
                warn!("Currency detection failed: {}", e);
                return base;
            }
        };

        match currency_for_country(&country).filter(|code| find_currency(code).is_some()) {
            Some(code) => {
                debug!(country = %country, currency = code, "Detected user currency");
                code.to_string()
            }
            None => {
                debug!(country = %country, "No currency mapped for country");
                base
            }
        }
    }
}
