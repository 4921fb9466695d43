//! HTTP Server configuration and startup.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use fx_types::KeyValueStore;

use super::handlers::{self, AppState};
use super::rate_limit::{RateLimiterState, rate_limit_middleware};
use crate::CurrencyService;

/// HTTP Server for the exchange-rate API.
pub struct HttpServer<S: KeyValueStore> {
    state: Arc<AppState<S>>,
    rate_limiter: Arc<RateLimiterState>,
}

impl<S: KeyValueStore> HttpServer<S> {
    /// Creates a new HTTP server with the given service.
    pub fn new(service: CurrencyService<S>) -> Self {
        Self {
            state: Arc::new(AppState { service }),
            rate_limiter: Arc::new(RateLimiterState::default()),
        }
    }

    /// Creates a new HTTP server with custom rate limiting.
    pub fn with_rate_limit(service: CurrencyService<S>, requests_per_minute: u32) -> Self {
        Self::with_rate_limiter(service, RateLimiterState::per_minute(requests_per_minute))
    }

    /// Creates a new HTTP server with a preconfigured limiter.
    pub fn with_rate_limiter(service: CurrencyService<S>, rate_limiter: RateLimiterState) -> Self {
        Self {
            state: Arc::new(AppState { service }),
            rate_limiter: Arc::new(rate_limiter),
        }
    }

    pub fn service(&self) -> &CurrencyService<S> {
        &self.state.service
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Uses the globally set MeterProvider
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        Router::new()
            .route("/health", get(handlers::health))
            .route("/api-docs/openapi.json", get(handlers::openapi_json))
            .route("/api/currencies", get(handlers::list_currencies::<S>))
            .route("/api/currencies/{code}", get(handlers::get_currency::<S>))
            .route("/api/rates", get(handlers::get_rates::<S>))
            .route("/api/rates/refresh", post(handlers::refresh_rates::<S>))
            .route("/api/status", get(handlers::get_status::<S>))
            .route("/api/convert", get(handlers::convert::<S>))
            .route("/api/format", get(handlers::format::<S>))
            .route("/api/detect", get(handlers::detect::<S>))
            .route(
                "/api/preference",
                get(handlers::get_preference::<S>).put(handlers::set_preference::<S>),
            )
            .layer(metrics)
            .layer(middleware::from_fn_with_state(
                self.rate_limiter.clone(),
                rate_limit_middleware,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address until Ctrl+C or SIGTERM.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        self.run_until(addr, shutdown_signal()).await
    }

    /// Runs the server until `shutdown` resolves, then drains connections.
    pub async fn run_until(
        self,
        addr: &str,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        // Peer addresses key the rate limiter
        let app = self
            .router()
            .into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
