// ABOUTME: Human-readable explanation text at the requested verbosity
// Templated from the Assessment rather than free-form, so output stays
// deterministic and testable like the rest of the scoring pipeline.
use crate::config::Verbosity;
use crate::response::{Explanation, RecommendedActionView};
use sentinel_types::{Assessment, ContextReport, ModelName, Signal};

fn model_contribution_lines(signals: &[Signal]) -> Vec<String> {
    signals
        .iter()
        .map(|s| format!("{}: {} (crisis_signal={:.2})", s.model_name, s.label, s.crisis_signal))
        .collect()
}

fn key_factors(assessment: &Assessment, context: Option<&ContextReport>) -> Vec<String> {
    let mut factors = Vec::new();
    if let Some(bart) = assessment.individual_scores.get(&ModelName::Bart) {
        if *bart > 0.5 {
            factors.push(format!("bart crisis signal elevated ({bart:.2})"));
        }
    }
    if !assessment.conflicts.is_empty() {
        factors.push(format!("{} conflict(s) detected between models", assessment.conflicts.len()));
    }
    if let Some(ctx) = context {
        if ctx.escalation_detected {
            factors.push(format!("escalation pattern: {:?}", ctx.escalation_pattern));
        }
        if ctx.temporal_factors.late_night_risk {
            factors.push("message sent during a high-risk overnight window".to_string());
        }
    }
    if factors.is_empty() {
        factors.push("no elevated risk factors detected".to_string());
    }
    factors
}

fn recommended_action_view(assessment: &Assessment) -> RecommendedActionView {
    let severity = assessment.severity;
    RecommendedActionView {
        priority: severity.to_string(),
        action: severity.recommended_action().to_string(),
        escalation: assessment.requires_review,
        rationale: format!(
            "severity {} with {} agreement among models",
            severity, assessment.agreement_level
        ),
    }
}

fn plain_text(assessment: &Assessment, is_degraded: bool) -> String {
    let base = format!(
        "Crisis score {:.2} ({} severity, {} confidence).",
        assessment.crisis_score, assessment.severity, assessment.agreement_level
    );
    if is_degraded {
        format!("{base} Response computed from a reduced set of models.")
    } else {
        base
    }
}

pub fn build(
    assessment: &Assessment,
    signals: &[Signal],
    context: Option<&ContextReport>,
    verbosity: Verbosity,
    is_degraded: bool,
) -> Explanation {
    let decision_summary = format!(
        "{} ({:.2}) -> {}",
        assessment.severity, assessment.crisis_score, assessment.severity.recommended_action()
    );

    let (factors, contributions) = match verbosity {
        Verbosity::Minimal => (Vec::new(), Vec::new()),
        Verbosity::Standard => (key_factors(assessment, context), Vec::new()),
        Verbosity::Detailed => (
            key_factors(assessment, context),
            model_contribution_lines(signals),
        ),
    };

    let conflict_summary = if assessment.conflicts.is_empty() {
        None
    } else {
        Some(format!(
            "{} conflict(s); resolved via {:?}",
            assessment.conflicts.len(),
            assessment.resolution_applied
        ))
    };

    Explanation {
        verbosity: match verbosity {
            Verbosity::Minimal => "minimal".to_string(),
            Verbosity::Standard => "standard".to_string(),
            Verbosity::Detailed => "detailed".to_string(),
        },
        decision_summary,
        key_factors: factors,
        recommended_action: recommended_action_view(assessment),
        plain_text: plain_text(assessment, is_degraded),
        confidence_summary: format!("{:.0}% confidence", assessment.confidence * 100.0),
        model_contributions: contributions,
        conflict_summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_types::{AgreementLevel, ResolutionStrategy, Severity, Weights};
    use std::collections::HashMap;

    fn sample_assessment() -> Assessment {
        Assessment {
            crisis_score: 0.8,
            severity: Severity::High,
            confidence: 0.9,
            agreement_level: AgreementLevel::StrongAgreement,
            is_crisis: true,
            conflicts: Vec::new(),
            requires_review: false,
            individual_scores: HashMap::new(),
            active_weights: Weights::canonical(),
            resolution_applied: None,
        }
    }

    #[test]
    fn minimal_verbosity_has_no_factors() {
        let e = build(&sample_assessment(), &[], None, Verbosity::Minimal, false);
        assert!(e.key_factors.is_empty());
        assert!(e.model_contributions.is_empty());
    }

    #[test]
    fn detailed_verbosity_includes_model_contributions() {
        let signal = Signal {
            model_name: ModelName::Bart,
            label: "hopelessness".to_string(),
            score: 0.8,
            all_scores: HashMap::new(),
            crisis_signal: 0.8,
            latency_ms: 10.0,
            success: true,
        };
        let e = build(&sample_assessment(), &[signal], None, Verbosity::Detailed, false);
        assert_eq!(e.model_contributions.len(), 1);
    }

    #[test]
    fn conflict_summary_absent_without_conflicts() {
        let e = build(&sample_assessment(), &[], None, Verbosity::Standard, false);
        assert!(e.conflict_summary.is_none());
    }

    #[test]
    fn conflict_summary_present_with_conflicts() {
        let mut a = sample_assessment();
        a.conflicts.push(sentinel_types::Conflict::label_disagreement());
        a.resolution_applied = Some(ResolutionStrategy::Conservative);
        let e = build(&a, &[], None, Verbosity::Standard, false);
        assert!(e.conflict_summary.is_some());
    }
}
