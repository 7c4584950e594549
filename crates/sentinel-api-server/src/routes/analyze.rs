// ABOUTME: POST /analyze endpoint
use crate::models::errors::ApiError;
use crate::models::requests::AnalyzeRequest;
use crate::server::AppState;
use axum::{extract::State, response::Json};
use chrono::Utc;
use sentinel_core::RawAnalyzeRequest;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

#[instrument(skip(state, request))]
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<sentinel_core::AnalyzeResponse>, ApiError> {
    let request_id = Uuid::new_v4();

    let raw = RawAnalyzeRequest {
        message: request.message,
        user_timezone: request.user_timezone,
        verbosity: request.verbosity,
        consensus_algorithm: request.consensus_algorithm,
        resolution_strategy: request.resolution_strategy,
        message_history: request
            .message_history
            .into_iter()
            .map(|h| sentinel_core::RawHistoryItem {
                message: h.message,
                timestamp: h.timestamp,
                crisis_score: h.crisis_score,
                message_id: h.message_id,
            })
            .collect(),
    };

    let response = state
        .engine
        .handle(raw, request_id.to_string(), Utc::now())
        .await
        .map_err(|e| ApiError::new(e, request_id))?;

    Ok(Json(response))
}
