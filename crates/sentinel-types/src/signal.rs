// ABOUTME: Per-model classifier verdict
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The four model roles the ensemble runs. A closed enumeration rather
/// than a string-keyed registry: missing-
/// model states become impossible by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelName {
    Bart,
    Sentiment,
    Irony,
    Emotions,
}

impl ModelName {
    pub const ALL: [ModelName; 4] = [
        ModelName::Bart,
        ModelName::Sentiment,
        ModelName::Irony,
        ModelName::Emotions,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ModelName::Bart => "bart",
            ModelName::Sentiment => "sentiment",
            ModelName::Irony => "irony",
            ModelName::Emotions => "emotions",
        }
    }
}

impl std::fmt::Display for ModelName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ModelName {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bart" => Ok(ModelName::Bart),
            "sentiment" => Ok(ModelName::Sentiment),
            "irony" => Ok(ModelName::Irony),
            "emotions" => Ok(ModelName::Emotions),
            _ => Err(()),
        }
    }
}

/// One model's verdict on one message.
///
/// When `success` is false the score-bearing fields are meaningless and
/// must not be read; the Signal is excluded from scoring entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub model_name: ModelName,
    pub label: String,
    pub score: f64,
    pub all_scores: HashMap<String, f64>,
    pub crisis_signal: f64,
    pub latency_ms: f64,
    pub success: bool,
}

impl Signal {
    pub fn failure(model_name: ModelName, latency_ms: f64) -> Self {
        Self {
            model_name,
            label: String::new(),
            score: 0.0,
            all_scores: HashMap::new(),
            crisis_signal: 0.0,
            latency_ms,
            success: false,
        }
    }
}
