//! # FX Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Build the cache store, rate providers and geolocator
//! - Seed rates from the cache and restore the preferred currency
//! - Start the background refresh worker
//! - Start the HTTP server

mod config;

use std::sync::Arc;

use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fx_hex::{
    CurrencyService, RateStore, RefreshWorker,
    inbound::{HttpServer, RateLimiterState},
};
use fx_providers::{FileStore, IpApiLocator, build_providers};
use fx_types::GeoLocator;

fn init_tracer() -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("fx-service"), provider))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize OpenTelemetry tracing
    let (otel_tracer, otel_provider) = init_tracer()?;
    let telemetry = tracing_opentelemetry::layer().with_tracer(otel_tracer);

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,fx_app=debug,fx_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    // Load configuration
    let config = config::Config::from_env()?;

    tracing::info!(
        base = %config.rates.base_currency,
        interval = ?config.rates.refresh_interval,
        "Starting fx server on port {}",
        config.port
    );
    tracing::info!("Using cache directory: {}", config.cache_dir.display());

    // Build adapters
    let store = FileStore::new(&config.cache_dir);
    let providers = build_providers(&config.providers);
    let geolocator: Arc<dyn GeoLocator> = match &config.geolocation_url {
        Some(url) => Arc::new(IpApiLocator::with_url(url)),
        None => Arc::new(IpApiLocator::new()),
    };

    // Seed from cache; the worker refreshes right away if that is stale
    let rates = Arc::new(RateStore::new(config.rates, providers, geolocator, store));
    tracing::info!(providers = ?rates.provider_ids(), "Rate providers configured");
    rates.initialize().await;

    let service = CurrencyService::new(rates.clone());
    if let Some(currency) = service.restore_preference().await {
        tracing::info!("Restored preferred currency {}", currency);
    }

    let worker = RefreshWorker::new(rates).spawn();

    // Create and run the HTTP server
    let limiter = RateLimiterState::per_minute(config.rate_limit_per_minute)
        .trust_forwarded_for(config.trust_proxy);
    let server = HttpServer::with_rate_limiter(service, limiter);
    let addr = format!("0.0.0.0:{}", config.port);

    let result = server.run(&addr).await;

    worker.shutdown().await;

    // Ensure traces are flushed before exit
    let _ = otel_provider.shutdown();
    result
}
