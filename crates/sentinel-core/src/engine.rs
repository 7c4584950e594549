// ABOUTME: Decision Engine: per-request orchestration
use crate::adapter::{self, RawHistoryItem};
use crate::alerting::{AlertEvent, AlertingHook};
use crate::cache::{fingerprint, ResponseCache};
use crate::config::{ConfigView, Verbosity};
use crate::context;
use crate::explain;
use crate::fallback::FallbackController;
use crate::response::{AnalyzeResponse, ConflictAnalysis, ConsensusView, SignalView};
use crate::scoring::score_with_consensus;
use crate::wrapper::{classify, ModelWrapper};
use chrono::{DateTime, Utc};
use sentinel_types::{ModelError, ModelName, SentinelError, Severity, Signal, Weights};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Fixed record of the four model roles.
#[derive(Clone)]
pub struct Wrappers {
    pub bart: Arc<dyn ModelWrapper>,
    pub sentiment: Arc<dyn ModelWrapper>,
    pub irony: Arc<dyn ModelWrapper>,
    pub emotions: Arc<dyn ModelWrapper>,
}

impl Wrappers {
    pub fn get(&self, model: ModelName) -> Arc<dyn ModelWrapper> {
        match model {
            ModelName::Bart => self.bart.clone(),
            ModelName::Sentiment => self.sentiment.clone(),
            ModelName::Irony => self.irony.clone(),
            ModelName::Emotions => self.emotions.clone(),
        }
    }

    pub async fn warmup_all(&self) {
        for model in ModelName::ALL {
            self.get(model).warmup().await;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RawAnalyzeRequest {
    pub message: String,
    pub user_timezone: Option<String>,
    pub verbosity: Option<String>,
    pub consensus_algorithm: Option<String>,
    pub resolution_strategy: Option<String>,
    pub message_history: Vec<RawHistoryItem>,
}

pub struct DecisionEngine {
    config: RwLock<Arc<ConfigView>>,
    wrappers: Wrappers,
    fallback: Arc<FallbackController>,
    cache: ResponseCache<AnalyzeResponse>,
    alerting: AlertingHook,
    started_at: Instant,
}

impl DecisionEngine {
    pub fn new(config: ConfigView, wrappers: Wrappers, alerting: AlertingHook) -> Self {
        let fallback = Arc::new(FallbackController::new(config.breaker.clone()));
        let cache = ResponseCache::new(config.cache.capacity, config.cache.ttl);
        Self {
            config: RwLock::new(Arc::new(config)),
            wrappers,
            fallback,
            cache,
            alerting,
            started_at: Instant::now(),
        }
    }

    pub fn config(&self) -> Arc<ConfigView> {
        self.config.read().expect("config lock poisoned").clone()
    }

    /// Atomically swaps in a new immutable snapshot; readers
    /// never observe a torn view.
    pub fn reload_config(&self, new_config: ConfigView) {
        *self.config.write().expect("config lock poisoned") = Arc::new(new_config);
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn fallback(&self) -> &FallbackController {
        &self.fallback
    }

    pub async fn warmup(&self) {
        self.wrappers.warmup_all().await;
    }

    /// Runs the four Wrappers concurrently, skipping any model whose
    /// breaker is open, and enforces the global request deadline by
    /// aborting outstanding tasks once it elapses.
    async fn run_wrappers(&self, text: &str, config: &ConfigView) -> Vec<Signal> {
        let active: Vec<ModelName> = ModelName::ALL
            .into_iter()
            .filter(|m| self.fallback.is_available(*m))
            .collect();

        let mut handles = Vec::with_capacity(active.len());
        for model in &active {
            let wrapper = self.wrappers.get(*model);
            let text = text.to_string();
            let per_model_timeout = config.timeouts.per_model;
            let fallback = self.fallback.clone();
            let handle = tokio::spawn(async move {
                classify(wrapper.as_ref(), &text, per_model_timeout, &fallback).await
            });
            handles.push((*model, handle));
        }

        let deadline = tokio::time::Instant::now() + config.timeouts.global_request;
        let mut signals = Vec::with_capacity(handles.len());
        for (model, handle) in handles {
            let abort = handle.abort_handle();
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            match tokio::time::timeout(remaining, handle).await {
                Ok(Ok(signal)) => signals.push(signal),
                Ok(Err(_)) => {
                    warn!(%model, "wrapper task joined with an error");
                    signals.push(Signal::failure(model, config.timeouts.global_request.as_secs_f64() * 1000.0));
                }
                Err(_) => {
                    abort.abort();
                    warn!(%model, "wrapper exceeded the global request deadline");
                    signals.push(Signal::failure(model, config.timeouts.global_request.as_secs_f64() * 1000.0));
                }
            }
        }
        signals
    }

    fn record_outcomes(&self, signals: &[Signal]) {
        for signal in signals {
            if signal.success {
                self.fallback.record_success(signal.model_name);
            } else {
                self.fallback.record_failure(signal.model_name, &ModelError::Timeout);
                if self.fallback.should_alert(signal.model_name) {
                    self.alerting.notify(AlertEvent::BreakerOpened {
                        model: signal.model_name,
                        consecutive_failures: 1,
                    });
                }
            }
        }
    }

    /// Full request pipeline.
    #[instrument(skip(self, raw))]
    pub async fn handle(
        &self,
        raw: RawAnalyzeRequest,
        request_id: String,
        now: DateTime<Utc>,
    ) -> Result<AnalyzeResponse, SentinelError> {
        let config = self.config();

        let normalized = adapter::validate_and_normalize(
            &raw.message,
            config.platform_message_cap,
            config.enforce_platform_message_cap,
            &raw.message_history,
            raw.user_timezone.as_deref(),
            raw.verbosity.as_deref(),
            raw.consensus_algorithm.as_deref(),
            raw.resolution_strategy.as_deref(),
        )
        .map_err(SentinelError::Validation)?;

        let has_history = !normalized.history.is_empty();
        let verbosity: Verbosity = normalized.verbosity.parse().unwrap_or_default();
        let consensus_algorithm = normalized
            .consensus_algorithm
            .unwrap_or(config.default_consensus_algorithm);
        let resolution_strategy = normalized
            .resolution_strategy
            .unwrap_or(config.resolution_strategy);

        let cache_key = fingerprint(
            &normalized.message,
            &normalized.verbosity,
            &format!("{resolution_strategy:?}"),
            &format!("{consensus_algorithm:?}"),
        );

        if !has_history {
            if let Some(mut cached) = self.cache.get(cache_key) {
                cached.request_id = request_id;
                cached.timestamp = now;
                return Ok(cached);
            }
        }

        let start = Instant::now();
        let signals = self.run_wrappers(&normalized.message, &config).await;
        self.record_outcomes(&signals);

        let successful: Vec<Signal> = signals.iter().filter(|s| s.success).cloned().collect();
        let is_degraded = successful.len() < ModelName::ALL.len();

        if successful.is_empty() {
            self.alerting.notify(AlertEvent::AllModelsFailed);
            return Ok(self.degraded_response(request_id, now, start.elapsed()));
        }

        let base_weights = config.weights.clone();
        let (mut assessment, vote_breakdown) = score_with_consensus(
            &successful,
            &base_weights,
            &config,
            consensus_algorithm,
            resolution_strategy,
        );

        let mut context_report = None;
        if has_history {
            let (report, warnings) = context::analyze(
                assessment.crisis_score,
                assessment.severity,
                &normalized.history,
                normalized.user_timezone.as_deref(),
                &config.default_timezone,
                now,
            );
            let modifier = report.temporal_factors.time_risk_modifier;
            assessment.crisis_score = (assessment.crisis_score * modifier).min(1.0);
            assessment.severity = Severity::from_score(assessment.crisis_score, &config.thresholds);
            assessment.is_crisis = assessment.severity != Severity::Safe;
            let _ = warnings;
            context_report = Some(report);
        }

        let response = self.build_response(
            &assessment,
            &vote_breakdown,
            &successful,
            &signals,
            context_report,
            consensus_algorithm,
            resolution_strategy,
            verbosity,
            is_degraded,
            request_id,
            now,
            start.elapsed(),
        );

        if !is_degraded && !has_history {
            self.cache.put(cache_key, response.clone());
        }

        Ok(response)
    }

    fn degraded_response(&self, request_id: String, now: DateTime<Utc>, elapsed: Duration) -> AnalyzeResponse {
        AnalyzeResponse {
            crisis_detected: false,
            severity: Severity::Safe,
            confidence: 0.0,
            crisis_score: 0.0,
            requires_intervention: false,
            recommended_action: Severity::Safe.recommended_action(),
            signals: HashMap::new(),
            explanation: crate::response::Explanation {
                verbosity: "minimal".to_string(),
                decision_summary: "all models unavailable".to_string(),
                key_factors: vec!["no classifier produced a result".to_string()],
                recommended_action: crate::response::RecommendedActionView {
                    priority: "safe".to_string(),
                    action: Severity::Safe.recommended_action().to_string(),
                    escalation: false,
                    rationale: "service degraded: no successful model signals".to_string(),
                },
                plain_text: "Unable to assess this message: all classifiers are currently unavailable.".to_string(),
                confidence_summary: "0% confidence".to_string(),
                model_contributions: Vec::new(),
                conflict_summary: None,
            },
            consensus: ConsensusView {
                algorithm: "weighted_voting".to_string(),
                crisis_score: 0.0,
                confidence: 0.0,
                agreement_level: sentinel_types::AgreementLevel::StrongAgreement,
                is_crisis: false,
                requires_review: true,
                has_conflict: false,
                individual_scores: HashMap::new(),
                vote_breakdown: crate::scoring::VoteBreakdown {
                    crisis_votes: 0,
                    total_votes: 0,
                    vote_threshold: 0.5,
                },
            },
            conflict_analysis: None,
            context_analysis: None,
            processing_time_ms: elapsed.as_secs_f64() * 1000.0,
            models_used: Vec::new(),
            is_degraded: true,
            request_id,
            timestamp: now,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn build_response(
        &self,
        assessment: &sentinel_types::Assessment,
        vote_breakdown: &crate::scoring::VoteBreakdown,
        successful: &[Signal],
        all_signals: &[Signal],
        context_report: Option<sentinel_types::ContextReport>,
        consensus_algorithm: sentinel_types::ConsensusAlgorithm,
        resolution_strategy: sentinel_types::ResolutionStrategy,
        verbosity: Verbosity,
        is_degraded: bool,
        request_id: String,
        now: DateTime<Utc>,
        elapsed: Duration,
    ) -> AnalyzeResponse {
        let signals_view: HashMap<String, SignalView> = successful
            .iter()
            .map(|s| {
                (
                    s.model_name.to_string(),
                    SignalView {
                        label: s.label.clone(),
                        score: s.score,
                        crisis_signal: s.crisis_signal,
                    },
                )
            })
            .collect();

        let explanation = explain::build(assessment, successful, context_report.as_ref(), verbosity, is_degraded);

        let conflict_analysis = if assessment.conflicts.is_empty() {
            None
        } else {
            Some(ConflictAnalysis {
                has_conflicts: true,
                conflict_count: assessment.conflicts.len(),
                conflicts: assessment.conflicts.clone(),
                highest_severity: sentinel_types::Conflict::highest_severity(&assessment.conflicts),
                requires_review: assessment.requires_review,
                summary: format!("{} conflict(s) detected", assessment.conflicts.len()),
                resolution_strategy: assessment.resolution_applied,
                original_score: assessment.individual_scores.values().cloned().fold(0.0, f64::max),
                resolved_score: assessment.crisis_score,
            })
        };

        let requires_intervention = assessment.requires_review
            || context_report
                .as_ref()
                .map(|c| {
                    matches!(
                        c.intervention.urgency,
                        sentinel_types::InterventionUrgency::High
                            | sentinel_types::InterventionUrgency::Immediate
                    )
                })
                .unwrap_or(false);

        let models_used: Vec<ModelName> = successful.iter().map(|s| s.model_name).collect();
        let _ = all_signals;
        let _ = resolution_strategy;

        AnalyzeResponse {
            crisis_detected: assessment.is_crisis,
            severity: assessment.severity,
            confidence: assessment.confidence,
            crisis_score: assessment.crisis_score,
            requires_intervention,
            recommended_action: assessment.severity.recommended_action(),
            signals: signals_view,
            explanation,
            consensus: ConsensusView {
                algorithm: format!("{consensus_algorithm:?}"),
                crisis_score: assessment.crisis_score,
                confidence: assessment.confidence,
                agreement_level: assessment.agreement_level,
                is_crisis: assessment.is_crisis,
                requires_review: assessment.requires_review,
                has_conflict: !assessment.conflicts.is_empty(),
                individual_scores: assessment.individual_scores.clone(),
                vote_breakdown: vote_breakdown.clone(),
            },
            conflict_analysis,
            context_analysis: context_report,
            processing_time_ms: elapsed.as_secs_f64() * 1000.0,
            models_used,
            is_degraded,
            request_id,
            timestamp: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wrapper::{ModelWrapper, RawClassification};
    use async_trait::async_trait;
    use std::collections::HashMap as StdHashMap;

    struct StaticWrapper {
        name: ModelName,
        label: String,
        score: f64,
        all_scores: StdHashMap<String, f64>,
    }

    #[async_trait]
    impl ModelWrapper for StaticWrapper {
        fn name(&self) -> ModelName {
            self.name
        }
        async fn infer(&self, _text: &str) -> Result<RawClassification, ModelError> {
            Ok(RawClassification {
                label: self.label.clone(),
                score: self.score,
                all_scores: self.all_scores.clone(),
            })
        }
    }

    fn safe_wrappers() -> Wrappers {
        Wrappers {
            bart: Arc::new(StaticWrapper {
                name: ModelName::Bart,
                label: "casual conversation".to_string(),
                score: 0.9,
                all_scores: [("casual conversation".to_string(), 0.9)].into_iter().collect(),
            }),
            sentiment: Arc::new(StaticWrapper {
                name: ModelName::Sentiment,
                label: "positive".to_string(),
                score: 0.8,
                all_scores: [("positive".to_string(), 0.8), ("negative".to_string(), 0.05)]
                    .into_iter()
                    .collect(),
            }),
            irony: Arc::new(StaticWrapper {
                name: ModelName::Irony,
                label: "non_irony".to_string(),
                score: 0.9,
                all_scores: [("non_irony".to_string(), 0.9), ("irony".to_string(), 0.1)]
                    .into_iter()
                    .collect(),
            }),
            emotions: Arc::new(StaticWrapper {
                name: ModelName::Emotions,
                label: "joy".to_string(),
                score: 0.8,
                all_scores: [("joy".to_string(), 0.8)].into_iter().collect(),
            }),
        }
    }

    #[tokio::test]
    async fn scenario_s2_clearly_safe_message() {
        let (hook, _rx) = AlertingHook::new(8);
        let engine = DecisionEngine::new(ConfigView::default(), safe_wrappers(), hook);
        let response = engine
            .handle(
                RawAnalyzeRequest {
                    message: "Had a great day gaming with friends!".to_string(),
                    ..Default::default()
                },
                "req-1".to_string(),
                Utc::now(),
            )
            .await
            .unwrap();
        assert_eq!(response.severity, Severity::Safe);
        assert!(response.crisis_score < 0.30);
        assert!(!response.crisis_detected);
    }

    #[tokio::test]
    async fn cache_hit_on_repeated_identical_request() {
        let (hook, _rx) = AlertingHook::new(8);
        let engine = DecisionEngine::new(ConfigView::default(), safe_wrappers(), hook);
        let now = Utc::now();
        let first = engine
            .handle(
                RawAnalyzeRequest {
                    message: "Had a great day gaming with friends!".to_string(),
                    ..Default::default()
                },
                "req-a".to_string(),
                now,
            )
            .await
            .unwrap();
        let second = engine
            .handle(
                RawAnalyzeRequest {
                    message: "Had a great day gaming with friends!".to_string(),
                    ..Default::default()
                },
                "req-b".to_string(),
                now,
            )
            .await
            .unwrap();
        assert_eq!(first.crisis_score, second.crisis_score);
        assert_eq!(second.request_id, "req-b");
    }

    #[tokio::test]
    async fn empty_message_is_a_validation_error() {
        let (hook, _rx) = AlertingHook::new(8);
        let engine = DecisionEngine::new(ConfigView::default(), safe_wrappers(), hook);
        let result = engine
            .handle(
                RawAnalyzeRequest {
                    message: "   ".to_string(),
                    ..Default::default()
                },
                "req-1".to_string(),
                Utc::now(),
            )
            .await;
        assert!(matches!(result, Err(SentinelError::Validation(_))));
    }
}
