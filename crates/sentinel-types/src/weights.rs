// ABOUTME: Per-model weight vector and renormalization
use crate::signal::ModelName;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Mapping from model name to a non-negative weight. The canonical,
/// all-models-succeeded weights sum to 1.0; after fallback redistribution
/// the active subset's weights always renormalize to 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weights(HashMap<ModelName, f64>);

impl Weights {
    pub fn new(map: HashMap<ModelName, f64>) -> Self {
        Self(map)
    }

    pub fn canonical() -> Self {
        let mut m = HashMap::new();
        m.insert(ModelName::Bart, 0.50);
        m.insert(ModelName::Sentiment, 0.25);
        m.insert(ModelName::Irony, 0.15);
        m.insert(ModelName::Emotions, 0.10);
        Self(m)
    }

    pub fn get(&self, model: ModelName) -> f64 {
        *self.0.get(&model).unwrap_or(&0.0)
    }

    pub fn set(&mut self, model: ModelName, weight: f64) {
        self.0.insert(model, weight);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ModelName, &f64)> {
        self.0.iter()
    }

    pub fn sum(&self) -> f64 {
        self.0.values().sum()
    }

    /// Renormalize so the surviving subset's weights sum to 1.0. Models not present in `active` are dropped
    /// entirely rather than kept at zero weight.
    pub fn renormalize_over(&self, active: &[ModelName]) -> Weights {
        let total: f64 = active.iter().map(|m| self.get(*m)).sum();
        let mut out = HashMap::new();
        if total <= 0.0 {
            return Weights(out);
        }
        for m in active {
            out.insert(*m, self.get(*m) / total);
        }
        Weights(out)
    }

    pub fn as_map(&self) -> &HashMap<ModelName, f64> {
        &self.0
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self::canonical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_weights_sum_to_one() {
        let w = Weights::canonical();
        assert!((w.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn renormalize_sums_to_one_over_subset() {
        let w = Weights::canonical();
        let active = [ModelName::Bart, ModelName::Irony, ModelName::Emotions];
        let r = w.renormalize_over(&active);
        assert!((r.sum() - 1.0).abs() < 1e-6);
        assert_eq!(r.get(ModelName::Sentiment), 0.0);
    }

    #[test]
    fn renormalize_matches_scenario_s6() {
        // sentiment fails; bart:0.50, irony:0.15, emotions:0.10 survive.
        let w = Weights::canonical();
        let active = [ModelName::Bart, ModelName::Irony, ModelName::Emotions];
        let r = w.renormalize_over(&active);
        assert!((r.get(ModelName::Bart) - 0.588).abs() < 1e-3);
        assert!((r.get(ModelName::Irony) - 0.176).abs() < 1e-3);
        assert!((r.get(ModelName::Emotions) - 0.235).abs() < 1e-3);
    }
}
