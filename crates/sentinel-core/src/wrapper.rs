// ABOUTME: Model Wrapper contract + per-model crisis-signal transforms
use crate::fallback::FallbackController;
use async_trait::async_trait;
use sentinel_types::{ModelError, ModelName, Signal};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{instrument, warn};

/// A single opaque classifier behind a uniform contract. Implementations
/// own exclusive access to their underlying model; the engine must not
/// issue concurrent calls to the same Wrapper within one request.
#[async_trait]
pub trait ModelWrapper: Send + Sync {
    fn name(&self) -> ModelName;

    /// Run the model on `text`, producing a raw label distribution. The
    /// per-model crisis-signal transform is applied by `classify`, not by
    /// this method, so each wrapper only needs to implement inference.
    async fn infer(&self, text: &str) -> Result<RawClassification, ModelError>;

    /// Prime any lazy initialization with a short known input. Cost is
    /// reported via tracing but never counted against request latency.
    async fn warmup(&self) {
        let _ = self.infer("hello world").await;
    }
}

#[derive(Debug, Clone)]
pub struct RawClassification {
    pub label: String,
    pub score: f64,
    pub all_scores: HashMap<String, f64>,
}

/// Runs `wrapper.infer` with a per-model timeout, retrying transient
/// failures through `fallback`'s backoff policy, and applies the model-
/// specific crisis-signal transform, producing a `Signal` either way
/// (success, or a failure marker once retries are exhausted).
#[instrument(skip(wrapper, text, fallback), fields(model = %wrapper.name()))]
pub async fn classify(
    wrapper: &dyn ModelWrapper,
    text: &str,
    timeout: Duration,
    fallback: &FallbackController,
) -> Signal {
    let start = Instant::now();
    let model = wrapper.name();
    let result = fallback
        .retry_with_backoff(|| async {
            match tokio::time::timeout(timeout, wrapper.infer(text)).await {
                Ok(inner) => inner,
                Err(_) => Err(ModelError::Timeout),
            }
        })
        .await;
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

    let raw = match result {
        Ok(raw) => raw,
        Err(_) => {
            warn!(%model, "classifier failed after retries");
            return Signal::failure(model, latency_ms);
        }
    };

    let crisis_signal = transform(model, &raw);
    Signal {
        model_name: model,
        label: raw.label,
        score: raw.score,
        all_scores: raw.all_scores,
        crisis_signal,
        latency_ms,
        success: true,
    }
}

pub(crate) const BART_CRISIS_LABELS: [&str; 6] = [
    "suicide ideation",
    "self-harm",
    "hopelessness",
    "emotional distress",
    "depression",
    "anxiety",
];
const BART_SAFE_LABELS: [&str; 3] = ["casual conversation", "positive sharing", "seeking support"];

pub fn bart_labels() -> Vec<&'static str> {
    BART_CRISIS_LABELS
        .iter()
        .chain(BART_SAFE_LABELS.iter())
        .copied()
        .collect()
}

const EMOTION_CRISIS_SET: [&str; 9] = [
    "grief",
    "sadness",
    "fear",
    "nervousness",
    "remorse",
    "disappointment",
    "disgust",
    "anger",
    "disapproval",
];
pub const EMOTION_POSITIVE_SET: [&str; 10] = [
    "joy",
    "love",
    "optimism",
    "gratitude",
    "admiration",
    "amusement",
    "excitement",
    "relief",
    "caring",
    "pride",
];

/// Per-model transform from raw classifier output to `crisis_signal`,
/// `irony`'s crisis_signal field is reporting-only; its
/// real contribution is the dampening factor computed separately.
fn transform(model: ModelName, raw: &RawClassification) -> f64 {
    match model {
        ModelName::Bart => {
            let mut crisis_signal: f64 = BART_CRISIS_LABELS
                .iter()
                .map(|l| raw.all_scores.get(*l).copied().unwrap_or(0.0))
                .sum();
            let top_is_critical = raw.label == "suicide ideation" || raw.label == "self-harm";
            if top_is_critical && raw.score > 0.5 {
                crisis_signal = (crisis_signal * 1.15).min(1.0);
            }
            crisis_signal
        }
        ModelName::Sentiment => raw.all_scores.get("negative").copied().unwrap_or(0.0),
        ModelName::Irony => {
            let irony_score = raw.all_scores.get("irony").copied().unwrap_or(0.0);
            1.0 - irony_score
        }
        ModelName::Emotions => {
            let crisis: f64 = EMOTION_CRISIS_SET
                .iter()
                .map(|l| raw.all_scores.get(*l).copied().unwrap_or(0.0))
                .sum();
            let positive: f64 = EMOTION_POSITIVE_SET
                .iter()
                .map(|l| raw.all_scores.get(*l).copied().unwrap_or(0.0))
                .sum();
            (crisis - 0.3 * positive).clamp(0.0, 1.0)
        }
    }
}

/// The irony model's dampening contribution,
/// computed separately from `crisis_signal` since it multiplies rather
/// than sums into the ensemble score.
pub fn irony_dampening_factor(irony_signal: Option<&Signal>) -> f64 {
    match irony_signal {
        Some(s) if s.success => {
            let irony_score = s.all_scores.get("irony").copied().unwrap_or(0.0);
            (1.0 - 0.35 * irony_score).clamp(0.5, 1.0)
        }
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn bart_sums_crisis_labels_only() {
        let raw = RawClassification {
            label: "hopelessness".to_string(),
            score: 0.4,
            all_scores: scores(&[
                ("hopelessness", 0.4),
                ("emotional distress", 0.2),
                ("casual conversation", 0.4),
            ]),
        };
        let signal = transform(ModelName::Bart, &raw);
        assert!((signal - 0.6).abs() < 1e-9);
    }

    #[test]
    fn bart_critical_label_boost_clamps_to_one() {
        let raw = RawClassification {
            label: "suicide ideation".to_string(),
            score: 0.9,
            all_scores: scores(&[("suicide ideation", 0.95)]),
        };
        let signal = transform(ModelName::Bart, &raw);
        assert_eq!(signal, 1.0);
    }

    #[test]
    fn bart_boost_not_applied_below_threshold() {
        let raw = RawClassification {
            label: "suicide ideation".to_string(),
            score: 0.4,
            all_scores: scores(&[("suicide ideation", 0.4)]),
        };
        let signal = transform(ModelName::Bart, &raw);
        assert!((signal - 0.4).abs() < 1e-9);
    }

    #[test]
    fn sentiment_uses_negative_score() {
        let raw = RawClassification {
            label: "negative".to_string(),
            score: 0.8,
            all_scores: scores(&[("negative", 0.8), ("neutral", 0.1), ("positive", 0.1)]),
        };
        assert!((transform(ModelName::Sentiment, &raw) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn irony_dampening_clamped_floor() {
        let s = Signal {
            model_name: ModelName::Irony,
            label: "irony".to_string(),
            score: 0.99,
            all_scores: scores(&[("irony", 0.99), ("non_irony", 0.01)]),
            crisis_signal: 0.01,
            latency_ms: 1.0,
            success: true,
        };
        let factor = irony_dampening_factor(Some(&s));
        assert!(factor >= 0.5);
    }

    #[test]
    fn irony_dampening_absent_is_identity() {
        assert_eq!(irony_dampening_factor(None), 1.0);
    }

    #[test]
    fn emotions_crisis_minus_positive_clamped() {
        let raw = RawClassification {
            label: "joy".to_string(),
            score: 0.9,
            all_scores: scores(&[("joy", 0.9), ("grief", 0.05)]),
        };
        let signal = transform(ModelName::Emotions, &raw);
        assert_eq!(signal, 0.0);
    }
}
