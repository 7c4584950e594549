// ABOUTME: Ordered severity/agreement enumerations
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Ordered crisis severity band. Ordering matters: `safe < low < medium
/// < high < critical`, used by context adjustment which may only move
/// severity upward, never down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Safe,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    const ORDER: [Severity; 5] = [
        Severity::Safe,
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    fn rank(self) -> usize {
        Self::ORDER.iter().position(|s| *s == self).unwrap()
    }

    /// The unique band whose threshold crosses `score`:
    /// `critical>=0.85, high>=0.70, medium>=0.50, low>=0.30, safe<0.30`.
    pub fn from_score(score: f64, thresholds: &SeverityThresholds) -> Severity {
        if score >= thresholds.critical {
            Severity::Critical
        } else if score >= thresholds.high {
            Severity::High
        } else if score >= thresholds.medium {
            Severity::Medium
        } else if score >= thresholds.low {
            Severity::Low
        } else {
            Severity::Safe
        }
    }

    pub fn recommended_action(self) -> RecommendedAction {
        match self {
            Severity::Critical => RecommendedAction::ImmediateOutreach,
            Severity::High => RecommendedAction::PriorityResponse,
            Severity::Medium => RecommendedAction::StandardMonitoring,
            Severity::Low => RecommendedAction::PassiveMonitoring,
            Severity::Safe => RecommendedAction::None,
        }
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Safe => "safe",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

/// Threshold bands for severity classification; part of the Config View
///.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SeverityThresholds {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            critical: 0.85,
            high: 0.70,
            medium: 0.50,
            low: 0.30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    ImmediateOutreach,
    PriorityResponse,
    StandardMonitoring,
    PassiveMonitoring,
    None,
}

impl fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecommendedAction::ImmediateOutreach => "immediate_outreach",
            RecommendedAction::PriorityResponse => "priority_response",
            RecommendedAction::StandardMonitoring => "standard_monitoring",
            RecommendedAction::PassiveMonitoring => "passive_monitoring",
            RecommendedAction::None => "none",
        };
        write!(f, "{s}")
    }
}

/// Categorical clustering of the four per-model crisis signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgreementLevel {
    StrongAgreement,
    ModerateAgreement,
    WeakAgreement,
    SignificantDisagreement,
}

impl AgreementLevel {
    /// Variance-to-band mapping.
    pub fn from_variance(variance: f64) -> Self {
        if variance < 0.05 {
            AgreementLevel::StrongAgreement
        } else if variance < 0.15 {
            AgreementLevel::ModerateAgreement
        } else if variance < 0.25 {
            AgreementLevel::WeakAgreement
        } else {
            AgreementLevel::SignificantDisagreement
        }
    }
}

impl fmt::Display for AgreementLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AgreementLevel::StrongAgreement => "strong_agreement",
            AgreementLevel::ModerateAgreement => "moderate_agreement",
            AgreementLevel::WeakAgreement => "weak_agreement",
            AgreementLevel::SignificantDisagreement => "significant_disagreement",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering_is_total() {
        assert!(Severity::Safe < Severity::Low);
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn from_score_picks_unique_band() {
        let t = SeverityThresholds::default();
        assert_eq!(Severity::from_score(0.0, &t), Severity::Safe);
        assert_eq!(Severity::from_score(0.29, &t), Severity::Safe);
        assert_eq!(Severity::from_score(0.30, &t), Severity::Low);
        assert_eq!(Severity::from_score(0.50, &t), Severity::Medium);
        assert_eq!(Severity::from_score(0.70, &t), Severity::High);
        assert_eq!(Severity::from_score(0.85, &t), Severity::Critical);
        assert_eq!(Severity::from_score(1.0, &t), Severity::Critical);
    }

    #[test]
    fn agreement_from_variance_bands() {
        assert_eq!(
            AgreementLevel::from_variance(0.0),
            AgreementLevel::StrongAgreement
        );
        assert_eq!(
            AgreementLevel::from_variance(0.10),
            AgreementLevel::ModerateAgreement
        );
        assert_eq!(
            AgreementLevel::from_variance(0.20),
            AgreementLevel::WeakAgreement
        );
        assert_eq!(
            AgreementLevel::from_variance(0.30),
            AgreementLevel::SignificantDisagreement
        );
    }
}
