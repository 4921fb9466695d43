//! HTTP-level tests for the inbound adapter.
//!
//! The router is driven with `tower::ServiceExt::oneshot`; no provider is
//! reachable, so every response is computed from the built-in rates.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    extract::ConnectInfo,
    http::{Method, Request, StatusCode},
};
use fx_hex::{
    CurrencyService, RateStore,
    inbound::{HttpServer, RateLimiterState},
};
use fx_providers::{ExchangeRateApiProvider, IpApiLocator, MemoryStore};
use fx_types::{RateProvider, RateStoreConfig};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower::ServiceExt;

/// A local URL nobody listens on.
async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

async fn create_test_server(requests_per_minute: u32) -> HttpServer<Arc<MemoryStore>> {
    HttpServer::with_rate_limit(create_test_service().await, requests_per_minute)
}

async fn create_test_service() -> CurrencyService<Arc<MemoryStore>> {
    let url = dead_url().await;
    let providers: Vec<Arc<dyn RateProvider>> =
        vec![Arc::new(ExchangeRateApiProvider::with_base_url(&url))];
    let rates = RateStore::new(
        RateStoreConfig::new("USD", Duration::from_secs(3600)),
        providers,
        Arc::new(IpApiLocator::with_url(format!("{}/json/", url))),
        Arc::new(MemoryStore::new()),
    );
    CurrencyService::new(Arc::new(rates))
}

async fn app() -> Router {
    create_test_server(1000).await.router()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn put_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::PUT)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app().await, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "healthy" }));
}

#[tokio::test]
async fn test_list_currencies() {
    let (status, body) = send(&app().await, get("/api/currencies")).await;
    assert_eq!(status, StatusCode::OK);

    let currencies = body.as_array().unwrap();
    assert_eq!(currencies.len(), 20);
    assert_eq!(currencies[0]["code"], "USD");
}

#[tokio::test]
async fn test_get_currency() {
    let app = app().await;

    let (status, body) = send(&app, get("/api/currencies/jpy")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "JPY");
    assert_eq!(body["decimal_places"], 0);

    let (status, body) = send(&app, get("/api/currencies/XYZ")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);

    let (status, _) = send(&app, get("/api/currencies/E1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rates_start_from_fallback() {
    let (status, body) = send(&app().await, get("/api/rates")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["base"], "USD");
    assert_eq!(body["rates"]["EUR"], 0.92);
    assert_eq!(body["timestamp"], 0);
    assert_eq!(body["stale"], true);
}

#[tokio::test]
async fn test_convert() {
    let (status, body) = send(
        &app().await,
        get("/api/convert?amount=100&from=usd&to=eur"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["from"], "USD");
    assert_eq!(body["to"], "EUR");
    assert!((body["result"].as_f64().unwrap() - 92.0).abs() < 1e-9);
    assert_eq!(body["formatted"], "€92.00");
}

#[tokio::test]
async fn test_convert_rejects_bad_input() {
    let app = app().await;

    let (status, body) = send(&app, get("/api/convert?amount=abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);

    let (status, _) = send(&app, get("/api/convert?amount=NaN")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, get("/api/convert?amount=1&to=EURO")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_format() {
    let app = app().await;

    let (status, body) = send(&app, get("/api/format?amount=29.99&currency=JPY")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["formatted"], "¥30");

    let (_, body) = send(
        &app,
        get("/api/format?amount=1234.5&currency=EUR&locale=de-DE"),
    )
    .await;
    assert_eq!(body["formatted"], "1.234,50\u{a0}€");

    let (_, body) = send(
        &app,
        get("/api/format?amount=10&currency=USD&show_symbol=false&show_code=true"),
    )
    .await;
    assert_eq!(body["formatted"], "10.00 USD");

    let (_, body) = send(&app, get("/api/format?amount=10&currency=XYZ")).await;
    assert_eq!(body["formatted"], "10.00 XYZ");
}

#[tokio::test]
async fn test_refresh_with_unreachable_provider() {
    let app = app().await;

    let (status, body) = send(
        &app,
        Request::builder()
            .method(Method::POST)
            .uri("/api/rates/refresh")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["refreshed"], false);
    assert_eq!(body["status"]["is_error"], true);
    assert_eq!(body["status"]["is_loading"], false);

    // Rates are still served.
    let (_, rates) = send(&app, get("/api/rates")).await;
    assert_eq!(rates["rates"]["EUR"], 0.92);
}

#[tokio::test]
async fn test_status() {
    let (status, body) = send(&app().await, get("/api/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_error"], false);
    assert_eq!(body["are_rates_stale"], true);
    assert_eq!(body["last_update"], Value::Null);
    assert_eq!(body["base_currency"], "USD");
    assert_eq!(body["preferred_currency"], "USD");
}

#[tokio::test]
async fn test_detect_falls_back_to_base() {
    let (status, body) = send(&app().await, get("/api/detect")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currency"], "USD");
}

#[tokio::test]
async fn test_preference_round_trip() {
    let app = app().await;

    let (status, body) = send(&app, put_json("/api/preference", r#"{"currency":"gbp"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currency"], "GBP");

    let (_, body) = send(&app, get("/api/preference")).await;
    assert_eq!(body["currency"], "GBP");

    let (_, body) = send(&app, get("/api/convert?amount=100")).await;
    assert_eq!(body["to"], "GBP");
    assert_eq!(body["formatted"], "£79.00");
}

#[tokio::test]
async fn test_preference_rejects_bad_input() {
    let app = app().await;

    let (status, body) = send(&app, put_json("/api/preference", r#"{"currency":"XYZ"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);

    let (status, _) = send(&app, put_json("/api/preference", "{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, get("/api/preference")).await;
    assert_eq!(body["currency"], "USD");
}

#[tokio::test]
async fn test_openapi_document() {
    let (status, body) = send(&app().await, get("/api-docs/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["openapi"].is_string());
    assert!(body["paths"]["/api/convert"].is_object());
}

/// A GET as seen by the server from `peer`, optionally carrying `X-Forwarded-For`.
fn get_from(uri: &str, peer: &str, forwarded_for: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(forwarded_for) = forwarded_for {
        builder = builder.header("X-Forwarded-For", forwarded_for);
    }
    let mut request = builder.body(Body::empty()).unwrap();
    let addr: SocketAddr = peer.parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(addr));
    request
}

#[tokio::test]
async fn test_rate_limiting_returns_429_when_exceeded() {
    let app = create_test_server(3).await.router();

    for i in 1..=3 {
        let (status, _) = send(&app, get_from("/api/status", "192.0.2.1:40000", None)).await;
        assert_eq!(status, StatusCode::OK, "request {} should pass", i);
    }

    let (status, body) = send(&app, get_from("/api/status", "192.0.2.1:40001", None)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["retry_after_seconds"], 60);

    // Another peer has its own quota.
    let (status, _) = send(&app, get_from("/api/status", "192.0.2.2:40000", None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_rotating_forwarded_for_does_not_bypass_limit() {
    let app = create_test_server(3).await.router();

    let mut limited = 0;
    for i in 0..10 {
        let forwarded = format!("198.51.100.{}", i);
        let (status, _) = send(
            &app,
            get_from("/api/status", "192.0.2.1:40000", Some(&forwarded)),
        )
        .await;
        if status == StatusCode::TOO_MANY_REQUESTS {
            limited += 1;
        }
    }
    assert_eq!(limited, 7);
}

#[tokio::test]
async fn test_trusted_proxy_limits_by_forwarded_for() {
    let app = HttpServer::with_rate_limiter(
        create_test_service().await,
        RateLimiterState::per_minute(1).trust_forwarded_for(true),
    )
    .router();

    let proxy = "10.0.0.1:443";
    let (status, _) = send(&app, get_from("/api/status", proxy, Some("203.0.113.7"))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, get_from("/api/status", proxy, Some("203.0.113.7"))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    let (status, _) = send(&app, get_from("/api/status", proxy, Some("203.0.113.8"))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_health_is_not_rate_limited() {
    let app = create_test_server(1).await.router();

    for _ in 0..5 {
        let (status, _) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
    }
}
