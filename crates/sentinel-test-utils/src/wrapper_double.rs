// ABOUTME: Scripted Model Wrapper test double for engine- and server-level tests
use async_trait::async_trait;
use sentinel_core::ModelWrapper;
use sentinel_core::wrapper::RawClassification;
use sentinel_types::{ModelError, ModelName};
use std::collections::HashMap;
use std::time::Duration;

/// A `ModelWrapper` double that returns a fixed label distribution, or a
/// fixed error, optionally after an artificial delay. Useful for exercising
/// the Decision Engine's timeout and fallback paths without a real sidecar.
pub struct ScriptedWrapper {
    name: ModelName,
    outcome: Outcome,
    delay: Duration,
}

enum Outcome {
    Classification(RawClassification),
    Error,
}

impl ScriptedWrapper {
    pub fn succeeding(name: ModelName, label: &str, score: f64, all_scores: HashMap<String, f64>) -> Self {
        Self {
            name,
            outcome: Outcome::Classification(RawClassification {
                label: label.to_string(),
                score,
                all_scores,
            }),
            delay: Duration::ZERO,
        }
    }

    pub fn failing(name: ModelName) -> Self {
        Self {
            name,
            outcome: Outcome::Error,
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl ModelWrapper for ScriptedWrapper {
    fn name(&self) -> ModelName {
        self.name
    }

    async fn infer(&self, _text: &str) -> Result<RawClassification, ModelError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.outcome {
            Outcome::Classification(raw) => Ok(raw.clone()),
            Outcome::Error => Err(ModelError::Remote),
        }
    }
}

/// A safe-message `Wrappers` set: all four models report their respective
/// "nothing wrong here" label with high confidence.
pub fn safe_wrappers() -> sentinel_core::Wrappers {
    use std::sync::Arc;
    sentinel_core::Wrappers {
        bart: Arc::new(ScriptedWrapper::succeeding(
            ModelName::Bart,
            "casual conversation",
            0.9,
            [("casual conversation".to_string(), 0.9)].into_iter().collect(),
        )),
        sentiment: Arc::new(ScriptedWrapper::succeeding(
            ModelName::Sentiment,
            "positive",
            0.8,
            [("positive".to_string(), 0.8), ("negative".to_string(), 0.05)]
                .into_iter()
                .collect(),
        )),
        irony: Arc::new(ScriptedWrapper::succeeding(
            ModelName::Irony,
            "non_irony",
            0.9,
            [("non_irony".to_string(), 0.9), ("irony".to_string(), 0.05)]
                .into_iter()
                .collect(),
        )),
        emotions: Arc::new(ScriptedWrapper::succeeding(
            ModelName::Emotions,
            "joy",
            0.8,
            [("joy".to_string(), 0.8)].into_iter().collect(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn succeeding_wrapper_returns_scripted_classification() {
        let wrapper = ScriptedWrapper::succeeding(
            ModelName::Bart,
            "hopelessness",
            0.7,
            [("hopelessness".to_string(), 0.7)].into_iter().collect(),
        );
        let raw = wrapper.infer("text").await.unwrap();
        assert_eq!(raw.label, "hopelessness");
        assert_eq!(raw.score, 0.7);
    }

    #[tokio::test]
    async fn failing_wrapper_returns_model_error() {
        let wrapper = ScriptedWrapper::failing(ModelName::Irony);
        assert!(wrapper.infer("text").await.is_err());
    }
}
