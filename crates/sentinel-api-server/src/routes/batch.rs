// ABOUTME: POST /analyze/batch endpoint
use crate::models::errors::ApiError;
use crate::models::requests::{BatchAnalyzeRequest, MAX_BATCH_MESSAGES, MIN_BATCH_MESSAGES};
use crate::server::AppState;
use axum::{extract::State, response::Json};
use chrono::Utc;
use sentinel_core::RawAnalyzeRequest;
use sentinel_core::response::{BatchResponse, BatchResultItem};
use sentinel_types::{SentinelError, Severity, ValidationError};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

const PREVIEW_LEN: usize = 80;

fn preview(message: &str) -> String {
    let mut chars: Vec<char> = message.chars().take(PREVIEW_LEN).collect();
    if message.chars().count() > PREVIEW_LEN {
        chars.push('\u{2026}');
    }
    chars.into_iter().collect()
}

/// Each message is scored independently through the same pipeline as
/// `/analyze`; batching is not required to run messages concurrently.
#[instrument(skip(state, request))]
pub async fn analyze_batch(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BatchAnalyzeRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    let request_id = Uuid::new_v4();

    if request.messages.len() < MIN_BATCH_MESSAGES || request.messages.len() > MAX_BATCH_MESSAGES {
        return Err(ApiError::new(
            SentinelError::Validation(ValidationError::HistoryTooLong {
                actual: request.messages.len(),
                max: MAX_BATCH_MESSAGES,
            }),
            request_id,
        ));
    }

    let mut results = Vec::with_capacity(request.messages.len());
    let mut crisis_count = 0;
    let mut critical_count = 0;
    let mut high_count = 0;

    for (index, message) in request.messages.into_iter().enumerate() {
        let raw = RawAnalyzeRequest {
            message: message.clone(),
            ..Default::default()
        };
        let outcome = state
            .engine
            .handle(raw, format!("{request_id}-{index}"), Utc::now())
            .await;

        let item = match outcome {
            Ok(response) => {
                if response.crisis_detected {
                    crisis_count += 1;
                }
                if response.severity == Severity::Critical {
                    critical_count += 1;
                }
                if response.severity == Severity::High {
                    high_count += 1;
                }
                BatchResultItem {
                    index,
                    message_preview: preview(&message),
                    crisis_detected: response.crisis_detected,
                    severity: response.severity,
                    crisis_score: response.crisis_score,
                    requires_intervention: response.requires_intervention,
                    explanation_summary: response.explanation.decision_summary,
                }
            }
            Err(_) => BatchResultItem {
                index,
                message_preview: preview(&message),
                crisis_detected: false,
                severity: Severity::Safe,
                crisis_score: 0.0,
                requires_intervention: false,
                explanation_summary: "validation failed for this message".to_string(),
            },
        };
        results.push(item);
    }

    Ok(Json(BatchResponse {
        total_messages: results.len(),
        crisis_count,
        critical_count,
        high_count,
        results,
    }))
}
