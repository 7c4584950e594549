// ABOUTME: Response envelope types matching the pinned wire format
// Field names are bit-exact so the Discord bot caller's existing
// deserializer keeps working unchanged.
use sentinel_types::{
    AgreementLevel, Conflict, ConflictSeverity, ContextReport, ModelName, RecommendedAction,
    ResolutionStrategy, Severity,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalView {
    pub label: String,
    pub score: f64,
    pub crisis_signal: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedActionView {
    pub priority: String,
    pub action: String,
    pub escalation: bool,
    pub rationale: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explanation {
    pub verbosity: String,
    pub decision_summary: String,
    pub key_factors: Vec<String>,
    pub recommended_action: RecommendedActionView,
    pub plain_text: String,
    pub confidence_summary: String,
    pub model_contributions: Vec<String>,
    pub conflict_summary: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusView {
    pub algorithm: String,
    pub crisis_score: f64,
    pub confidence: f64,
    pub agreement_level: AgreementLevel,
    pub is_crisis: bool,
    pub requires_review: bool,
    pub has_conflict: bool,
    pub individual_scores: HashMap<ModelName, f64>,
    pub vote_breakdown: crate::scoring::VoteBreakdown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictAnalysis {
    pub has_conflicts: bool,
    pub conflict_count: usize,
    pub conflicts: Vec<Conflict>,
    pub highest_severity: Option<ConflictSeverity>,
    pub requires_review: bool,
    pub summary: String,
    pub resolution_strategy: Option<ResolutionStrategy>,
    pub original_score: f64,
    pub resolved_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub crisis_detected: bool,
    pub severity: Severity,
    pub confidence: f64,
    pub crisis_score: f64,
    pub requires_intervention: bool,
    pub recommended_action: RecommendedAction,
    pub signals: HashMap<String, SignalView>,
    pub explanation: Explanation,
    pub consensus: ConsensusView,
    pub conflict_analysis: Option<ConflictAnalysis>,
    pub context_analysis: Option<ContextReport>,
    pub processing_time_ms: f64,
    pub models_used: Vec<ModelName>,
    pub is_degraded: bool,
    pub request_id: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResultItem {
    pub index: usize,
    pub message_preview: String,
    pub crisis_detected: bool,
    pub severity: Severity,
    pub crisis_score: f64,
    pub requires_intervention: bool,
    pub explanation_summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    pub total_messages: usize,
    pub crisis_count: usize,
    pub critical_count: usize,
    pub high_count: usize,
    pub results: Vec<BatchResultItem>,
}
