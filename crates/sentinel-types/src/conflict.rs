// ABOUTME: Conflict taxonomy produced by the Scoring Kernel
use crate::signal::ModelName;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    ScoreDisagreement,
    IronySentimentConflict,
    EmotionCrisisMismatch,
    LabelDisagreement,
}

/// A named, severity-tagged condition under which the ensemble's verdict
/// is considered unreliable enough to warrant review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conflict {
    #[serde(rename = "type")]
    pub kind: ConflictType,
    pub severity: ConflictSeverity,
    pub models: Vec<ModelName>,
    pub description: String,
    pub values: HashMap<String, f64>,
}

impl Conflict {
    pub fn score_disagreement(a: ModelName, a_val: f64, b: ModelName, b_val: f64) -> Self {
        let mut values = HashMap::new();
        values.insert(a.to_string(), a_val);
        values.insert(b.to_string(), b_val);
        Conflict {
            kind: ConflictType::ScoreDisagreement,
            severity: ConflictSeverity::High,
            models: vec![a, b],
            description: format!(
                "{a} and {b} crisis signals differ by {:.3}",
                (a_val - b_val).abs()
            ),
            values,
        }
    }

    pub fn irony_sentiment_conflict(irony_score: f64) -> Self {
        let mut values = HashMap::new();
        values.insert("irony_score".to_string(), irony_score);
        Conflict {
            kind: ConflictType::IronySentimentConflict,
            severity: ConflictSeverity::Medium,
            models: vec![ModelName::Irony, ModelName::Sentiment],
            description:
                "high irony score co-occurs with a negative sentiment label".to_string(),
            values,
        }
    }

    pub fn emotion_crisis_mismatch(bart_crisis_signal: f64) -> Self {
        let mut values = HashMap::new();
        values.insert("bart_crisis_signal".to_string(), bart_crisis_signal);
        Conflict {
            kind: ConflictType::EmotionCrisisMismatch,
            severity: ConflictSeverity::Medium,
            models: vec![ModelName::Bart, ModelName::Emotions],
            description: "bart signals high crisis while the dominant emotion is positive"
                .to_string(),
            values,
        }
    }

    pub fn label_disagreement() -> Self {
        Conflict {
            kind: ConflictType::LabelDisagreement,
            severity: ConflictSeverity::Low,
            models: vec![ModelName::Bart, ModelName::Sentiment],
            description: "bart's top label is a crisis label but sentiment is not negative"
                .to_string(),
            values: HashMap::new(),
        }
    }

    pub fn has_high_severity(conflicts: &[Conflict]) -> bool {
        conflicts
            .iter()
            .any(|c| c.severity == ConflictSeverity::High)
    }

    pub fn highest_severity(conflicts: &[Conflict]) -> Option<ConflictSeverity> {
        conflicts.iter().map(|c| c.severity).max_by_key(|s| match s {
            ConflictSeverity::Low => 0,
            ConflictSeverity::Medium => 1,
            ConflictSeverity::High => 2,
        })
    }
}
