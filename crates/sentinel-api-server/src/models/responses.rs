// ABOUTME: HTTP-layer response types not already defined by the decision engine
use sentinel_types::{ConsensusAlgorithm, ModelName, ResolutionStrategy, SeverityThresholds, Weights};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub ready: bool,
    pub degraded: bool,
    pub models_loaded: usize,
    pub total_models: usize,
    pub uptime_seconds: u64,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusConfigResponse {
    pub default_algorithm: ConsensusAlgorithm,
    pub weights: Weights,
    pub thresholds: SeverityThresholds,
    pub conflict_detection_enabled: bool,
    pub resolution_strategy: ResolutionStrategy,
    pub explainability_verbosity: String,
}

pub const ALL_MODELS: [ModelName; 4] = ModelName::ALL;
