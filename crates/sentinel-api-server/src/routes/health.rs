// ABOUTME: GET /health endpoint
use crate::models::responses::HealthResponse;
use crate::server::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use sentinel_types::ModelName;
use std::sync::Arc;
use tracing::instrument;

#[instrument(skip(state))]
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let active = state.engine.fallback().active_models();
    let total = ModelName::ALL.len();
    let models_loaded = active.len();

    let (status, http_status) = if models_loaded == total {
        ("healthy", StatusCode::OK)
    } else if models_loaded > 0 {
        ("degraded", StatusCode::OK)
    } else {
        ("unhealthy", StatusCode::SERVICE_UNAVAILABLE)
    };

    let response = HealthResponse {
        status: status.to_string(),
        ready: models_loaded > 0,
        degraded: models_loaded < total,
        models_loaded,
        total_models: total,
        uptime_seconds: state.engine.uptime().as_secs(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    };

    (http_status, Json(response))
}
