// ABOUTME: Immutable Config View snapshot, rebuildable at runtime
use sentinel_types::{ConsensusAlgorithm, ModelName, ResolutionStrategy, SeverityThresholds, Weights};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    Minimal,
    Standard,
    Detailed,
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Standard
    }
}

impl std::str::FromStr for Verbosity {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minimal" => Ok(Verbosity::Minimal),
            "standard" => Ok(Verbosity::Standard),
            "detailed" => Ok(Verbosity::Detailed),
            _ => Err(()),
        }
    }
}

/// Breaker/retry tuning.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct BreakerConfig {
    #[validate(range(min = 1, max = 100))]
    pub trip_threshold: usize,
    pub cooldown: Duration,
    #[validate(range(min = 0, max = 10))]
    pub max_retries: usize,
    pub retry_base_delay: Duration,
    pub retry_max_delay: Duration,
    pub alert_cooldown: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            trip_threshold: 3,
            cooldown: Duration::from_secs(60),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(100),
            retry_max_delay: Duration::from_secs(1),
            alert_cooldown: Duration::from_secs(5 * 60),
        }
    }
}

#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct CacheConfig {
    #[validate(range(min = 1, max = 1_000_000))]
    pub capacity: usize,
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 512,
            ttl: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct TimeoutConfig {
    pub per_model: Duration,
    pub global_request: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            per_model: Duration::from_millis(1500),
            global_request: Duration::from_secs(3),
        }
    }
}

/// The read-only snapshot consumed by the Scoring Kernel, Fallback
/// Controller, and Decision Engine. Rebuilt from
/// defaults + environment overlay; swapped atomically by `reload`, never
/// mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigView {
    pub weights: Weights,
    pub thresholds: SeverityThresholds,
    pub safety_bias: f64,
    pub conflict_detection_enabled: bool,
    pub resolution_strategy: ResolutionStrategy,
    pub default_consensus_algorithm: ConsensusAlgorithm,
    pub unanimous_threshold: f64,
    pub verbosity: Verbosity,
    pub breaker: BreakerConfig,
    pub cache: CacheConfig,
    pub timeouts: TimeoutConfig,
    pub default_timezone: String,
    /// When set, hard-fail above the platform cap instead of smart-truncating.
    pub enforce_platform_message_cap: bool,
    pub platform_message_cap: usize,
}

impl Default for ConfigView {
    fn default() -> Self {
        Self {
            weights: Weights::canonical(),
            thresholds: SeverityThresholds::default(),
            safety_bias: 0.03,
            conflict_detection_enabled: true,
            resolution_strategy: ResolutionStrategy::default(),
            default_consensus_algorithm: ConsensusAlgorithm::default(),
            unanimous_threshold: 0.6,
            verbosity: Verbosity::default(),
            breaker: BreakerConfig::default(),
            cache: CacheConfig::default(),
            timeouts: TimeoutConfig::default(),
            default_timezone: "UTC".to_string(),
            enforce_platform_message_cap: false,
            platform_message_cap: 2000,
        }
    }
}

fn env_f64(name: &str, current: f64) -> f64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(current)
}

fn env_u64(name: &str, current: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(current)
}

fn env_usize(name: &str, current: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(current)
}

impl ConfigView {
    /// Build a snapshot from defaults overlaid with the `NLP_*` environment
    /// `NLP_*` environment variables. Unset variables leave the default.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        let mut weights_map = HashMap::new();
        weights_map.insert(
            ModelName::Bart,
            env_f64("NLP_WEIGHT_BART", cfg.weights.get(ModelName::Bart)),
        );
        weights_map.insert(
            ModelName::Sentiment,
            env_f64(
                "NLP_WEIGHT_SENTIMENT",
                cfg.weights.get(ModelName::Sentiment),
            ),
        );
        weights_map.insert(
            ModelName::Irony,
            env_f64("NLP_WEIGHT_IRONY", cfg.weights.get(ModelName::Irony)),
        );
        weights_map.insert(
            ModelName::Emotions,
            env_f64(
                "NLP_WEIGHT_EMOTIONS",
                cfg.weights.get(ModelName::Emotions),
            ),
        );
        cfg.weights = Weights::new(weights_map);

        cfg.thresholds.critical = env_f64("NLP_THRESHOLD_CRITICAL", cfg.thresholds.critical);
        cfg.thresholds.high = env_f64("NLP_THRESHOLD_HIGH", cfg.thresholds.high);
        cfg.thresholds.medium = env_f64("NLP_THRESHOLD_MEDIUM", cfg.thresholds.medium);
        cfg.thresholds.low = env_f64("NLP_THRESHOLD_LOW", cfg.thresholds.low);

        cfg.safety_bias = env_f64("NLP_SAFETY_BIAS", cfg.safety_bias);

        cfg.timeouts.per_model = Duration::from_millis(env_u64(
            "NLP_PER_MODEL_TIMEOUT_MS",
            cfg.timeouts.per_model.as_millis() as u64,
        ));
        cfg.timeouts.global_request = Duration::from_millis(env_u64(
            "NLP_REQUEST_TIMEOUT_MS",
            cfg.timeouts.global_request.as_millis() as u64,
        ));

        cfg.cache.capacity = env_usize("NLP_CACHE_CAPACITY", cfg.cache.capacity);
        cfg.cache.ttl = Duration::from_secs(env_u64(
            "NLP_CACHE_TTL_SECONDS",
            cfg.cache.ttl.as_secs(),
        ));

        cfg.breaker.trip_threshold =
            env_usize("NLP_BREAKER_FAILURE_THRESHOLD", cfg.breaker.trip_threshold);
        cfg.breaker.cooldown = Duration::from_secs(env_u64(
            "NLP_BREAKER_COOLDOWN_SECONDS",
            cfg.breaker.cooldown.as_secs(),
        ));

        if let Ok(tz) = env::var("NLP_DEFAULT_TIMEZONE") {
            cfg.default_timezone = tz;
        }

        cfg
    }

    /// Validate the numeric invariants a snapshot must hold before it is
    /// published. Unlike a `validator`-derive-only approach,
    /// cross-field invariants (weights non-negative, thresholds ordered)
    /// are checked explicitly since `validator` can't express them here.
    pub fn validate_invariants(&self) -> Result<(), String> {
        for (name, w) in self.weights.iter() {
            if *w < 0.0 {
                return Err(format!("weight for {name} is negative: {w}"));
            }
        }
        let t = &self.thresholds;
        if !(t.low < t.medium && t.medium < t.high && t.high < t.critical) {
            return Err("severity thresholds must be strictly increasing".to_string());
        }
        if !(0.0..=1.0).contains(&self.unanimous_threshold) {
            return Err("unanimous_threshold must be in [0,1]".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ConfigView::default().validate_invariants().is_ok());
    }

    #[test]
    fn from_env_overlays_weights() {
        env::set_var("NLP_WEIGHT_BART", "0.6");
        let cfg = ConfigView::from_env();
        assert_eq!(cfg.weights.get(ModelName::Bart), 0.6);
        env::remove_var("NLP_WEIGHT_BART");
    }
}
