// ABOUTME: GET/PUT /config/consensus endpoints for the runtime-mutable Config View subset
use crate::models::errors::ApiError;
use crate::models::requests::ConsensusConfigRequest;
use crate::models::responses::ConsensusConfigResponse;
use crate::server::AppState;
use axum::{extract::State, response::Json};
use sentinel_types::{ModelName, SentinelError, Weights};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

#[instrument(skip(state))]
pub async fn get_consensus_config(State(state): State<Arc<AppState>>) -> Json<ConsensusConfigResponse> {
    let config = state.engine.config();
    Json(ConsensusConfigResponse {
        default_algorithm: config.default_consensus_algorithm,
        weights: config.weights.clone(),
        thresholds: config.thresholds.clone(),
        conflict_detection_enabled: config.conflict_detection_enabled,
        resolution_strategy: config.resolution_strategy,
        explainability_verbosity: format!("{:?}", config.verbosity).to_lowercase(),
    })
}

#[instrument(skip(state, request))]
pub async fn put_consensus_config(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConsensusConfigRequest>,
) -> Result<Json<ConsensusConfigResponse>, ApiError> {
    let mut config = (*state.engine.config()).clone();

    if let Some(algorithm) = &request.default_algorithm {
        config.default_consensus_algorithm = algorithm.parse().map_err(|_| {
            ApiError::new(
                SentinelError::Internal(format!("unrecognized consensus algorithm: {algorithm}")),
                Uuid::new_v4(),
            )
        })?;
    }
    if let Some(weights) = &request.weights {
        let mut map: HashMap<ModelName, f64> = HashMap::new();
        for (name, value) in weights {
            let model: ModelName = name.parse().map_err(|_| {
                ApiError::new(
                    SentinelError::Internal(format!("unrecognized model name: {name}")),
                    Uuid::new_v4(),
                )
            })?;
            map.insert(model, *value);
        }
        config.weights = Weights::new(map);
    }
    if let Some(thresholds) = &request.thresholds {
        if let Some(v) = thresholds.crisis {
            config.thresholds.critical = v;
        }
        if let Some(v) = thresholds.majority {
            config.thresholds.high = v;
        }
        if let Some(v) = thresholds.unanimous {
            config.unanimous_threshold = v;
        }
        if let Some(v) = thresholds.disagreement {
            config.thresholds.medium = v;
        }
    }
    if let Some(enabled) = request.conflict_detection_enabled {
        config.conflict_detection_enabled = enabled;
    }
    if let Some(strategy) = &request.resolution_strategy {
        config.resolution_strategy = strategy.parse().map_err(|_| {
            ApiError::new(
                SentinelError::Internal(format!("unrecognized resolution strategy: {strategy}")),
                Uuid::new_v4(),
            )
        })?;
    }
    if let Some(verbosity) = &request.explainability_verbosity {
        config.verbosity = verbosity.parse().unwrap_or(config.verbosity);
    }

    state.engine.reload_config(config);
    Ok(get_consensus_config(State(state)).await)
}
