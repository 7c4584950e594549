// ABOUTME: Request model definitions for the analyze/batch/config endpoints
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct HistoryItemRequest {
    pub message: String,
    pub timestamp: String,
    pub crisis_score: Option<f64>,
    pub message_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyzeRequest {
    pub message: String,
    pub user_id: Option<String>,
    pub channel_id: Option<String>,
    pub metadata: Option<serde_json::Value>,
    #[serde(default = "default_true")]
    pub include_explanation: bool,
    pub verbosity: Option<String>,
    pub consensus_algorithm: Option<String>,
    pub resolution_strategy: Option<String>,
    #[serde(default)]
    pub message_history: Vec<HistoryItemRequest>,
    pub user_timezone: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchAnalyzeRequest {
    pub messages: Vec<String>,
    #[serde(default)]
    pub include_details: bool,
    #[serde(default = "default_true")]
    pub include_explanation: bool,
}

pub const MIN_BATCH_MESSAGES: usize = 1;
pub const MAX_BATCH_MESSAGES: usize = 100;

/// Runtime-mutable subset of the Config View, exposed via `GET`/`PUT
/// /config/consensus`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConsensusConfigRequest {
    pub default_algorithm: Option<String>,
    pub weights: Option<HashMap<String, f64>>,
    pub thresholds: Option<ConsensusThresholdsRequest>,
    pub conflict_detection_enabled: Option<bool>,
    pub resolution_strategy: Option<String>,
    pub explainability_verbosity: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConsensusThresholdsRequest {
    pub crisis: Option<f64>,
    pub majority: Option<f64>,
    pub unanimous: Option<f64>,
    pub disagreement: Option<f64>,
}
