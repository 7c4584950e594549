// ABOUTME: Per-user message history and the Context Analyzer's report
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One prior message, supplied inline by the caller on each request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryItem {
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub crisis_score: Option<f64>,
    pub message_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationRate {
    None,
    Improving,
    Stable,
    Gradual,
    Rapid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationPattern {
    None,
    Linear,
    Exponential,
    Spike,
    Plateau,
    Oscillating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Stable,
    Escalating,
    Volatile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionUrgency {
    None,
    Low,
    Standard,
    High,
    Immediate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trend {
    pub direction: TrendDirection,
    pub velocity: f64,
    pub score_delta: f64,
    pub time_span_hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalFactors {
    pub late_night_risk: bool,
    pub rapid_posting: bool,
    pub is_weekend: bool,
    pub hour_of_day: u32,
    /// Always in [1.0, 1.5]; only ever multiplies a score upward.
    pub time_risk_modifier: f64,
    pub timezone_used: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trajectory {
    pub start_score: f64,
    pub end_score: f64,
    pub peak_score: f64,
    pub scores: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intervention {
    pub urgency: InterventionUrgency,
    pub recommended_point: Option<String>,
    pub intervention_delayed: bool,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryAnalyzed {
    pub message_count: usize,
    pub time_span_hours: f64,
    pub oldest_timestamp: Option<DateTime<Utc>>,
    pub newest_timestamp: Option<DateTime<Utc>>,
}

/// Output of the Context Analyzer. Reporting-only except
/// for `temporal_factors.time_risk_modifier`, which the Decision Engine
/// applies multiplicatively to the kernel's `crisis_score`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextReport {
    pub escalation_detected: bool,
    pub escalation_rate: EscalationRate,
    pub escalation_pattern: EscalationPattern,
    pub pattern_confidence: f64,
    pub trend: Trend,
    pub temporal_factors: TemporalFactors,
    pub trajectory: Trajectory,
    pub intervention: Intervention,
    pub history_analyzed: HistoryAnalyzed,
}

/// Extra diagnostics surfaced to the caller without affecting scoring,
/// e.g. an invalid timezone falling back to the default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    pub warnings: Vec<String>,
    pub was_truncated: bool,
}

pub type ScoreMap = HashMap<String, f64>;
