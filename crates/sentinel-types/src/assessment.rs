// ABOUTME: Scoring Kernel output
use crate::conflict::Conflict;
use crate::severity::{AgreementLevel, RecommendedAction, Severity};
use crate::signal::ModelName;
use crate::weights::Weights;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    Conservative,
    Optimistic,
    Mean,
    ReviewFlag,
}

impl Default for ResolutionStrategy {
    fn default() -> Self {
        ResolutionStrategy::Conservative
    }
}

impl std::str::FromStr for ResolutionStrategy {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "conservative" => Ok(ResolutionStrategy::Conservative),
            "optimistic" => Ok(ResolutionStrategy::Optimistic),
            "mean" => Ok(ResolutionStrategy::Mean),
            "review_flag" => Ok(ResolutionStrategy::ReviewFlag),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusAlgorithm {
    WeightedVoting,
    MajorityVoting,
    Unanimous,
    ConflictAware,
}

impl Default for ConsensusAlgorithm {
    fn default() -> Self {
        ConsensusAlgorithm::WeightedVoting
    }
}

impl std::str::FromStr for ConsensusAlgorithm {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weighted_voting" => Ok(ConsensusAlgorithm::WeightedVoting),
            "majority_voting" => Ok(ConsensusAlgorithm::MajorityVoting),
            "unanimous" => Ok(ConsensusAlgorithm::Unanimous),
            "conflict_aware" => Ok(ConsensusAlgorithm::ConflictAware),
            _ => Err(()),
        }
    }
}

/// The full output of the Scoring Kernel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub crisis_score: f64,
    pub severity: Severity,
    pub confidence: f64,
    pub agreement_level: AgreementLevel,
    pub is_crisis: bool,
    pub conflicts: Vec<Conflict>,
    pub requires_review: bool,
    pub individual_scores: HashMap<ModelName, f64>,
    pub active_weights: Weights,
    pub resolution_applied: Option<ResolutionStrategy>,
}
