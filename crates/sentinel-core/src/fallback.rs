// ABOUTME: Fallback Controller: per-model breaker state machine + retry policy
use crate::config::BreakerConfig;
use dashmap::DashMap;
use rand::Rng;
use sentinel_types::{BreakerState, BreakerStatus, ModelError, ModelName, Weights};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub struct FallbackController {
    config: BreakerConfig,
    breakers: DashMap<ModelName, BreakerState>,
    last_alert: DashMap<ModelName, Instant>,
}

impl FallbackController {
    pub fn new(config: BreakerConfig) -> Self {
        let breakers = DashMap::new();
        for model in ModelName::ALL {
            breakers.insert(model, BreakerState::default());
        }
        Self {
            config,
            breakers,
            last_alert: DashMap::new(),
        }
    }

    /// Whether `model` may be invoked this request. Open breakers
    /// transition to half-open once the cooldown elapses; half-open
    /// breakers admit a bounded number of probe requests.
    pub fn is_available(&self, model: ModelName) -> bool {
        let mut entry = self.breakers.entry(model).or_default();
        match entry.status {
            BreakerStatus::Closed => true,
            BreakerStatus::Open => {
                let elapsed = entry.opened_at.map(|t| t.elapsed()).unwrap_or_default();
                if elapsed >= self.config.cooldown {
                    entry.status = BreakerStatus::HalfOpen;
                    entry.half_open_probes_remaining = 1;
                    info!(%model, "breaker cooldown elapsed, entering half-open");
                    true
                } else {
                    false
                }
            }
            BreakerStatus::HalfOpen => entry.half_open_probes_remaining > 0,
        }
    }

    /// Record a successful call. Closes the breaker unconditionally;
    /// a single successful half-open probe is enough to close it again.
    pub fn record_success(&self, model: ModelName) {
        let mut entry = self.breakers.entry(model).or_default();
        if entry.status != BreakerStatus::Closed {
            info!(%model, "breaker closing after successful probe");
        }
        *entry = BreakerState::default();
    }

    /// Record a failed call. Fatal errors trip the breaker immediately;
    /// transient errors only trip after `trip_threshold` consecutive
    /// failures. A failed half-open probe reopens the breaker.
    pub fn record_failure(&self, model: ModelName, err: &ModelError) {
        let mut entry = self.breakers.entry(model).or_default();
        match entry.status {
            BreakerStatus::HalfOpen => {
                entry.status = BreakerStatus::Open;
                entry.opened_at = Some(Instant::now());
                entry.half_open_probes_remaining = 0;
                warn!(%model, "half-open probe failed, reopening breaker");
                return;
            }
            _ => {}
        }
        entry.consecutive_failures += 1;
        if !err.is_transient() || entry.consecutive_failures >= self.config.trip_threshold {
            entry.status = BreakerStatus::Open;
            entry.opened_at = Some(Instant::now());
            warn!(%model, failures = entry.consecutive_failures, fatal = !err.is_transient(), "breaker tripped");
        }
    }

    pub fn breaker_status(&self, model: ModelName) -> BreakerStatus {
        self.breakers.entry(model).or_default().status
    }

    /// Models currently eligible to participate in the ensemble.
    pub fn active_models(&self) -> Vec<ModelName> {
        ModelName::ALL
            .into_iter()
            .filter(|m| self.is_available(*m))
            .collect()
    }

    /// Weights renormalized over the currently-active subset. Returns the canonical weights unchanged if all models are up.
    pub fn active_weights(&self, base: &Weights) -> Weights {
        let active = self.active_models();
        if active.len() == ModelName::ALL.len() {
            return base.clone();
        }
        base.renormalize_over(&active)
    }

    /// Rate-limits operator alerts per model so a flapping breaker doesn't
    /// flood the alert channel.
    pub fn should_alert(&self, model: ModelName) -> bool {
        let now = Instant::now();
        let mut last = self.last_alert.entry(model).or_insert(now - self.config.alert_cooldown * 2);
        if now.duration_since(*last) >= self.config.alert_cooldown {
            *last = now;
            true
        } else {
            false
        }
    }

    /// Retries a transient failure up to `max_retries` times with
    /// exponential backoff and jitter. Fatal errors are never retried.
    pub async fn retry_with_backoff<F, Fut, T>(&self, mut f: F) -> Result<T, ModelError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ModelError>>,
    {
        let mut attempt = 0;
        let mut delay = self.config.retry_base_delay;
        loop {
            match f().await {
                Ok(v) => return Ok(v),
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) if attempt >= self.config.max_retries => return Err(e),
                Err(_) => {
                    let jitter_ms = rand::thread_rng().gen_range(0..=delay.as_millis() as u64 / 10 + 1);
                    tokio::time::sleep(delay + Duration::from_millis(jitter_ms)).await;
                    delay = (delay * 2).min(self.config.retry_max_delay);
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn breaker_trips_after_threshold_transient_failures() {
        let ctrl = FallbackController::new(BreakerConfig {
            trip_threshold: 3,
            ..BreakerConfig::default()
        });
        for _ in 0..2 {
            ctrl.record_failure(ModelName::Irony, &ModelError::Timeout);
            assert!(ctrl.is_available(ModelName::Irony));
        }
        ctrl.record_failure(ModelName::Irony, &ModelError::Timeout);
        assert!(!ctrl.is_available(ModelName::Irony));
    }

    #[test]
    fn fatal_error_trips_immediately() {
        let ctrl = FallbackController::new(BreakerConfig::default());
        ctrl.record_failure(ModelName::Bart, &ModelError::Fatal);
        assert!(!ctrl.is_available(ModelName::Bart));
    }

    #[test]
    fn success_closes_breaker() {
        let ctrl = FallbackController::new(BreakerConfig::default());
        ctrl.record_failure(ModelName::Bart, &ModelError::Fatal);
        ctrl.record_success(ModelName::Bart);
        assert!(ctrl.is_available(ModelName::Bart));
        assert_eq!(ctrl.breaker_status(ModelName::Bart), BreakerStatus::Closed);
    }

    #[test]
    fn active_weights_renormalize_over_subset() {
        let ctrl = FallbackController::new(BreakerConfig::default());
        ctrl.record_failure(ModelName::Sentiment, &ModelError::Fatal);
        let w = ctrl.active_weights(&Weights::canonical());
        assert!((w.sum() - 1.0).abs() < 1e-9);
        assert_eq!(w.get(ModelName::Sentiment), 0.0);
    }

    #[test]
    fn alert_rate_limited_per_model() {
        let ctrl = FallbackController::new(BreakerConfig::default());
        assert!(ctrl.should_alert(ModelName::Bart));
        assert!(!ctrl.should_alert(ModelName::Bart));
    }

    #[tokio::test]
    async fn retry_with_backoff_gives_up_after_max_retries() {
        let ctrl = FallbackController::new(BreakerConfig {
            max_retries: 2,
            retry_base_delay: Duration::from_millis(1),
            retry_max_delay: Duration::from_millis(4),
            ..BreakerConfig::default()
        });
        let calls = Arc::new(AtomicUsize::new(0));
        let calls2 = calls.clone();
        let result: Result<(), ModelError> = ctrl
            .retry_with_backoff(|| {
                let calls = calls2.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(ModelError::Timeout)
                }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retry_with_backoff_does_not_retry_fatal() {
        let ctrl = FallbackController::new(BreakerConfig::default());
        let calls = Arc::new(AtomicUsize::new(0));
        let calls2 = calls.clone();
        let result: Result<(), ModelError> = ctrl
            .retry_with_backoff(|| {
                let calls = calls2.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(ModelError::Fatal)
                }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
