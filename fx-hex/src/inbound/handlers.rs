//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use utoipa::OpenApi;

use fx_types::{
    AppError, ConvertQuery, CurrencyResponse, DetectResponse, FormatQuery, KeyValueStore,
    PreferenceResponse, RefreshResponse, SetPreferenceRequest,
};

use crate::CurrencyService;
use crate::openapi::ApiDoc;

/// Application state shared across handlers.
pub struct AppState<S: KeyValueStore> {
    pub service: CurrencyService<S>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(AppError::BadRequest(rejection.body_text()))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(AppError::BadRequest(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Serves the generated OpenAPI document.
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog
// ─────────────────────────────────────────────────────────────────────────────

pub async fn list_currencies<S: KeyValueStore>(
    State(state): State<Arc<AppState<S>>>,
) -> impl IntoResponse {
    let currencies: Vec<CurrencyResponse> = state
        .service
        .supported_currencies()
        .iter()
        .map(CurrencyResponse::from)
        .collect();
    Json(currencies)
}

#[tracing::instrument(skip(state))]
pub async fn get_currency<S: KeyValueStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let currency = state.service.currency(&code)?;
    Ok(Json(CurrencyResponse::from(currency)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Rates
// ─────────────────────────────────────────────────────────────────────────────

pub async fn get_rates<S: KeyValueStore>(
    State(state): State<Arc<AppState<S>>>,
) -> impl IntoResponse {
    Json(state.service.rates_response())
}

/// Forces a refresh. Always 200; `refreshed` says whether any provider answered.
#[tracing::instrument(skip(state))]
pub async fn refresh_rates<S: KeyValueStore>(
    State(state): State<Arc<AppState<S>>>,
) -> impl IntoResponse {
    let refreshed = state.service.refresh_rates().await;
    Json(RefreshResponse {
        refreshed,
        status: state.service.status(),
    })
}

pub async fn get_status<S: KeyValueStore>(
    State(state): State<Arc<AppState<S>>>,
) -> impl IntoResponse {
    Json(state.service.status())
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversion & Formatting
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip_all)]
pub async fn convert<S: KeyValueStore>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<ConvertQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let response = state.service.convert_query(&query)?;
    Ok(Json(response))
}

#[tracing::instrument(skip_all)]
pub async fn format<S: KeyValueStore>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<FormatQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let response = state.service.format_query(&query)?;
    Ok(Json(response))
}

// ─────────────────────────────────────────────────────────────────────────────
// Detection & Preference
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state))]
pub async fn detect<S: KeyValueStore>(
    State(state): State<Arc<AppState<S>>>,
) -> impl IntoResponse {
    Json(DetectResponse {
        currency: state.service.detect_user_currency().await,
    })
}

pub async fn get_preference<S: KeyValueStore>(
    State(state): State<Arc<AppState<S>>>,
) -> impl IntoResponse {
    Json(PreferenceResponse {
        currency: state.service.preferred_currency(),
    })
}

#[tracing::instrument(skip_all)]
pub async fn set_preference<S: KeyValueStore>(
    State(state): State<Arc<AppState<S>>>,
    request: Result<Json<SetPreferenceRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = request?;
    let currency = state.service.set_preferred_currency(&request.currency).await?;
    Ok(Json(PreferenceResponse { currency }))
}
