//! End-to-end refresh tests: real HTTP providers against a local mock
//! server, with the file-backed cache.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::{Json, Router, extract::Path, http::StatusCode, routing::get};
use fx_hex::{RATES_CACHE_KEY, RateStore};
use fx_providers::{ExchangeRateApiProvider, FileStore, FixerProvider, IpApiLocator};
use fx_types::{CachedRates, KeyValueStore, RateProvider, RateStoreConfig};
use serde_json::json;
use tokio::net::TcpListener;

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn store(
    providers: Vec<Arc<dyn RateProvider>>,
    geo_url: &str,
    cache: FileStore,
) -> RateStore<FileStore> {
    RateStore::new(
        RateStoreConfig::new("USD", Duration::from_secs(3600)),
        providers,
        Arc::new(IpApiLocator::with_url(geo_url)),
        cache,
    )
}

/// Mock exchangerate-api that counts hits.
fn exchangerate_app(hits: Arc<AtomicUsize>) -> Router {
    Router::new().route(
        "/latest/{base}",
        get(move |Path(base): Path<String>| {
            hits.fetch_add(1, Ordering::SeqCst);
            async move {
                Json(json!({ "base": base, "rates": { "USD": 1.0, "EUR": 0.9, "GBP": 0.75 } }))
            }
        }),
    )
}

#[tokio::test]
async fn test_refresh_persists_and_next_start_uses_cache() {
    let dir = tempfile::tempdir().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let url = serve(exchangerate_app(hits.clone())).await;

    let first = store(
        vec![Arc::new(ExchangeRateApiProvider::with_base_url(&url))],
        &url,
        FileStore::new(dir.path()),
    );
    assert!(first.refresh().await);
    assert_eq!(first.snapshot().rate("GBP"), Some(0.75));

    let raw = first.store().get(RATES_CACHE_KEY).await.unwrap().unwrap();
    let cached: CachedRates = serde_json::from_str(&raw).unwrap();
    assert_eq!(cached.rates.get("EUR"), Some(&0.9));

    let second = store(
        vec![Arc::new(ExchangeRateApiProvider::with_base_url(&url))],
        &url,
        FileStore::new(dir.path()),
    );
    assert!(second.initialize().await);
    assert_eq!(second.snapshot().rate("GBP"), Some(0.75));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failing_provider_leaves_rates_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let app = Router::new().route(
        "/latest/{base}",
        get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let url = serve(app).await;

    let rates = store(
        vec![Arc::new(ExchangeRateApiProvider::with_base_url(&url))],
        &url,
        FileStore::new(dir.path()),
    );
    let before = rates.snapshot();

    assert!(!rates.refresh().await);
    assert!(Arc::ptr_eq(&before, &rates.snapshot()));
    assert!(rates.is_error());
    assert_eq!(rates.store().get(RATES_CACHE_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn test_fixer_fallback_is_rebased() {
    let dir = tempfile::tempdir().unwrap();
    let app = Router::new()
        .route(
            "/latest/{base}",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        )
        .route(
            "/latest",
            get(|| async {
                Json(json!({
                    "success": true,
                    "base": "EUR",
                    "rates": { "EUR": 1.0, "USD": 1.25, "GBP": 1.0 }
                }))
            }),
        );
    let url = serve(app).await;

    let providers: Vec<Arc<dyn RateProvider>> = vec![
        Arc::new(ExchangeRateApiProvider::with_base_url(&url)),
        Arc::new(FixerProvider::with_base_url(&url, Some("key".into()))),
    ];
    let rates = store(providers, &url, FileStore::new(dir.path()));

    assert!(rates.refresh().await);

    let snapshot = rates.snapshot();
    assert_eq!(snapshot.rate("USD"), Some(1.0));
    assert!((snapshot.rate("EUR").unwrap() - 0.8).abs() < 1e-12);
    assert!((snapshot.rate("GBP").unwrap() - 0.8).abs() < 1e-12);
}

#[tokio::test]
async fn test_detect_user_currency_over_http() {
    let dir = tempfile::tempdir().unwrap();
    let app = Router::new().route(
        "/json/",
        get(|| async { Json(json!({ "country_code": "CH" })) }),
    );
    let url = serve(app).await;

    let rates = store(vec![], &format!("{}/json/", url), FileStore::new(dir.path()));

    assert_eq!(rates.detect_user_currency().await, "CHF");
}

#[tokio::test]
async fn test_detect_user_currency_unreachable() {
    let dir = tempfile::tempdir().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let rates = store(
        vec![],
        &format!("http://{}/json/", addr),
        FileStore::new(dir.path()),
    );

    assert_eq!(rates.detect_user_currency().await, "USD");
}
