// ABOUTME: Scoring Kernel: pure fusion of Signals into an Assessment
use crate::config::ConfigView;
use crate::wrapper::{irony_dampening_factor, BART_CRISIS_LABELS, EMOTION_POSITIVE_SET};
use sentinel_types::{
    AgreementLevel, Assessment, Conflict, ConsensusAlgorithm, ModelName, ResolutionStrategy,
    Severity, Signal, Weights,
};
use std::collections::HashMap;

fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}

fn find<'a>(signals: &'a [Signal], model: ModelName) -> Option<&'a Signal> {
    signals.iter().find(|s| s.model_name == model)
}

/// `signals` must contain only successful
/// Signals; callers (the Decision Engine) are responsible for excluding
/// failed ones before calling in. `resolution_strategy` is the effective
/// strategy for this request -- ordinarily `config.resolution_strategy`,
/// but the consensus-algorithm overlay in `score_with_consensus` may
/// override it for `conflict_aware`.
pub fn score(
    signals: &[Signal],
    base_weights: &Weights,
    config: &ConfigView,
    resolution_strategy: ResolutionStrategy,
) -> Assessment {
    let active_models: Vec<ModelName> = signals.iter().map(|s| s.model_name).collect();
    let active_weights = base_weights.renormalize_over(&active_models);

    let non_irony: Vec<&Signal> = signals
        .iter()
        .filter(|s| s.model_name != ModelName::Irony)
        .collect();

    // Step 2: base score, irony excluded from the sum.
    let base: f64 = non_irony
        .iter()
        .map(|s| s.crisis_signal * active_weights.get(s.model_name))
        .sum();

    // Step 3: irony dampening.
    let irony_signal = find(signals, ModelName::Irony);
    let dampening = irony_dampening_factor(irony_signal);
    let mut crisis_score = base * dampening;

    // Step 4: safety bias.
    let bart_emotions_max = [ModelName::Bart, ModelName::Emotions]
        .iter()
        .filter_map(|m| find(signals, *m))
        .map(|s| s.crisis_signal)
        .fold(f64::MIN, f64::max);
    let sentiment_max = find(signals, ModelName::Sentiment)
        .map(|s| s.crisis_signal)
        .unwrap_or(f64::MIN);
    if bart_emotions_max > f64::MIN
        && sentiment_max > f64::MIN
        && bart_emotions_max - sentiment_max > 0.4
    {
        crisis_score = (crisis_score + config.safety_bias).min(1.0);
    }

    // Step 6: confidence from variance of non-irony crisis signals.
    let non_irony_signals: Vec<f64> = non_irony.iter().map(|s| s.crisis_signal).collect();
    let var = variance(&non_irony_signals);
    let confidence = if non_irony_signals.len() <= 1 {
        1.0
    } else {
        (1.0 - var).clamp(0.0, 1.0)
    };

    // Step 7: agreement level, possibly upgraded after conflict detection below.
    let mut agreement_level = AgreementLevel::from_variance(var);

    // Step 8: conflict detection.
    let mut conflicts = Vec::new();
    if config.conflict_detection_enabled {
        for i in 0..non_irony.len() {
            for j in (i + 1)..non_irony.len() {
                let a = non_irony[i];
                let b = non_irony[j];
                if (a.crisis_signal - b.crisis_signal).abs() >= 0.5 {
                    conflicts.push(Conflict::score_disagreement(
                        a.model_name,
                        a.crisis_signal,
                        b.model_name,
                        b.crisis_signal,
                    ));
                }
            }
        }

        if let (Some(irony), Some(sentiment)) = (
            irony_signal,
            find(signals, ModelName::Sentiment),
        ) {
            let irony_score = irony.all_scores.get("irony").copied().unwrap_or(0.0);
            if irony_score > 0.7 && sentiment.label == "negative" {
                conflicts.push(Conflict::irony_sentiment_conflict(irony_score));
            }
        }

        if let (Some(bart), Some(emotions)) =
            (find(signals, ModelName::Bart), find(signals, ModelName::Emotions))
        {
            if bart.crisis_signal > 0.7
                && EMOTION_POSITIVE_SET.contains(&emotions.label.as_str())
            {
                conflicts.push(Conflict::emotion_crisis_mismatch(bart.crisis_signal));
            }
        }

        if let (Some(bart), Some(sentiment)) =
            (find(signals, ModelName::Bart), find(signals, ModelName::Sentiment))
        {
            if BART_CRISIS_LABELS.contains(&bart.label.as_str()) && sentiment.label != "negative" {
                conflicts.push(Conflict::label_disagreement());
            }
        }
    }

    if Conflict::has_high_severity(&conflicts) {
        agreement_level = AgreementLevel::SignificantDisagreement;
    }

    // Step 9: conflict resolution.
    let mut resolution_applied = None;
    let mut force_review = false;
    if !conflicts.is_empty() {
        resolution_applied = Some(resolution_strategy);
        let non_irony_values: Vec<f64> = non_irony.iter().map(|s| s.crisis_signal).collect();
        match resolution_strategy {
            ResolutionStrategy::Conservative => {
                if Conflict::has_high_severity(&conflicts) {
                    if let Some(max) = non_irony_values.iter().cloned().fold(None, |acc: Option<f64>, v| {
                        Some(acc.map_or(v, |a: f64| a.max(v)))
                    }) {
                        crisis_score = crisis_score.max(max);
                    }
                }
            }
            ResolutionStrategy::Optimistic => {
                if let Some(min) = non_irony_values.iter().cloned().fold(None, |acc: Option<f64>, v| {
                    Some(acc.map_or(v, |a: f64| a.min(v)))
                }) {
                    crisis_score = min;
                }
            }
            ResolutionStrategy::Mean => {
                if !non_irony_values.is_empty() {
                    crisis_score =
                        non_irony_values.iter().sum::<f64>() / non_irony_values.len() as f64;
                }
            }
            ResolutionStrategy::ReviewFlag => {
                if Conflict::has_high_severity(&conflicts) {
                    if let Some(max) = non_irony_values.iter().cloned().fold(None, |acc: Option<f64>, v| {
                        Some(acc.map_or(v, |a: f64| a.max(v)))
                    }) {
                        crisis_score = crisis_score.max(max);
                    }
                }
                force_review = true;
            }
        }
    }

    crisis_score = crisis_score.clamp(0.0, 1.0);
    let severity = Severity::from_score(crisis_score, &config.thresholds);

    // requires_review: disagreement or a high-severity conflict forces human review.
    let requires_review = force_review
        || agreement_level == AgreementLevel::SignificantDisagreement
        || Conflict::has_high_severity(&conflicts)
        || severity == Severity::Critical;

    let individual_scores: HashMap<ModelName, f64> =
        signals.iter().map(|s| (s.model_name, s.crisis_signal)).collect();

    Assessment {
        crisis_score,
        severity,
        confidence,
        agreement_level,
        is_crisis: severity != Severity::Safe,
        conflicts,
        requires_review,
        individual_scores,
        active_weights,
        resolution_applied,
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct VoteBreakdown {
    pub crisis_votes: usize,
    pub total_votes: usize,
    pub vote_threshold: f64,
}

/// Dispatches on the per-request `consensus_algorithm`:
/// `weighted_voting` runs the kernel unchanged; `majority_voting` and
/// `unanimous` override `is_crisis` by vote-counting instead of severity;
/// `conflict_aware` forces `review_flag` resolution whenever a conflict
/// exists, then runs the normal severity-based `is_crisis`.
pub fn score_with_consensus(
    signals: &[Signal],
    base_weights: &Weights,
    config: &ConfigView,
    consensus_algorithm: ConsensusAlgorithm,
    resolution_strategy: ResolutionStrategy,
) -> (Assessment, VoteBreakdown) {
    let effective_resolution = if consensus_algorithm == ConsensusAlgorithm::ConflictAware {
        ResolutionStrategy::ReviewFlag
    } else {
        resolution_strategy
    };

    let mut assessment = score(signals, base_weights, config, effective_resolution);

    let total_votes = signals.len();
    let crisis_votes = signals.iter().filter(|s| s.crisis_signal >= 0.5).count();

    let vote_breakdown = match consensus_algorithm {
        ConsensusAlgorithm::WeightedVoting | ConsensusAlgorithm::ConflictAware => VoteBreakdown {
            crisis_votes,
            total_votes,
            vote_threshold: 0.5,
        },
        ConsensusAlgorithm::MajorityVoting => {
            assessment.is_crisis = total_votes > 0 && crisis_votes * 2 >= total_votes;
            VoteBreakdown {
                crisis_votes,
                total_votes,
                vote_threshold: 0.5,
            }
        }
        ConsensusAlgorithm::Unanimous => {
            assessment.is_crisis = total_votes > 0
                && signals
                    .iter()
                    .all(|s| s.crisis_signal >= config.unanimous_threshold);
            VoteBreakdown {
                crisis_votes,
                total_votes,
                vote_threshold: config.unanimous_threshold,
            }
        }
    };

    (assessment, vote_breakdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_types::Signal;

    fn signal(model: ModelName, crisis_signal: f64, label: &str) -> Signal {
        Signal {
            model_name: model,
            label: label.to_string(),
            score: crisis_signal,
            all_scores: HashMap::new(),
            crisis_signal,
            latency_ms: 5.0,
            success: true,
        }
    }

    fn all_four() -> Vec<Signal> {
        vec![
            signal(ModelName::Bart, 0.85, "hopelessness"),
            signal(ModelName::Sentiment, 0.9, "negative"),
            signal(ModelName::Irony, 0.1, "non_irony"),
            signal(ModelName::Emotions, 0.7, "grief"),
        ]
    }

    #[test]
    fn crisis_score_stays_in_unit_interval() {
        let a = score(
            &all_four(),
            &Weights::canonical(),
            &ConfigView::default(),
            ResolutionStrategy::Conservative,
        );
        assert!((0.0..=1.0).contains(&a.crisis_score));
    }

    #[test]
    fn scenario_s5_model_disagreement_forces_review() {
        let signals = vec![
            signal(ModelName::Bart, 0.85, "hopelessness"),
            signal(ModelName::Sentiment, 0.20, "neutral"),
            {
                let mut s = signal(ModelName::Irony, 0.0, "non_irony");
                s.all_scores.insert("irony".to_string(), 0.1);
                s
            },
            signal(ModelName::Emotions, 0.75, "grief"),
        ];
        let a = score(
            &signals,
            &Weights::canonical(),
            &ConfigView::default(),
            ResolutionStrategy::Conservative,
        );
        assert!(Conflict::has_high_severity(&a.conflicts));
        assert_eq!(a.agreement_level, AgreementLevel::SignificantDisagreement);
        assert!(a.requires_review);
        assert!((a.crisis_score - 0.85).abs() < 1e-9);
    }

    #[test]
    fn single_signal_has_full_confidence() {
        let signals = vec![signal(ModelName::Bart, 0.5, "depression")];
        let a = score(
            &signals,
            &Weights::canonical(),
            &ConfigView::default(),
            ResolutionStrategy::Conservative,
        );
        assert_eq!(a.confidence, 1.0);
    }

    #[test]
    fn majority_voting_overrides_is_crisis() {
        let signals = vec![
            signal(ModelName::Bart, 0.6, "depression"),
            signal(ModelName::Sentiment, 0.6, "negative"),
            signal(ModelName::Irony, 0.0, "non_irony"),
            signal(ModelName::Emotions, 0.1, "joy"),
        ];
        let (assessment, votes) = score_with_consensus(
            &signals,
            &Weights::canonical(),
            &ConfigView::default(),
            ConsensusAlgorithm::MajorityVoting,
            ResolutionStrategy::Conservative,
        );
        assert_eq!(votes.crisis_votes, 2);
        assert!(assessment.is_crisis);
    }

    #[test]
    fn unanimous_requires_every_model_above_threshold() {
        let signals = vec![
            signal(ModelName::Bart, 0.9, "hopelessness"),
            signal(ModelName::Sentiment, 0.3, "neutral"),
        ];
        let (assessment, _) = score_with_consensus(
            &signals,
            &Weights::canonical(),
            &ConfigView::default(),
            ConsensusAlgorithm::Unanimous,
            ResolutionStrategy::Conservative,
        );
        assert!(!assessment.is_crisis);
    }

    #[test]
    fn idempotent_on_repeated_evaluation() {
        let signals = all_four();
        let cfg = ConfigView::default();
        let a1 = score(&signals, &Weights::canonical(), &cfg, ResolutionStrategy::Conservative);
        let a2 = score(&signals, &Weights::canonical(), &cfg, ResolutionStrategy::Conservative);
        assert_eq!(a1.crisis_score, a2.crisis_score);
        assert_eq!(a1.severity, a2.severity);
    }
}
