// ABOUTME: Builders for Signals, history items, and config snapshots used across the test suite
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use sentinel_core::ConfigView;
use sentinel_types::{HistoryItem, ModelName, Signal};
use std::collections::HashMap;

/// A successful Signal with a given crisis_signal, everything else defaulted
/// to plausible values.
pub fn sample_signal(model: ModelName, crisis_signal: f64) -> Signal {
    Signal {
        model_name: model,
        label: "sample".to_string(),
        score: crisis_signal,
        all_scores: HashMap::new(),
        crisis_signal,
        latency_ms: 42.0,
        success: true,
    }
}

/// A failed Signal, as produced by a timed-out or erroring classifier.
pub fn failed_signal(model: ModelName) -> Signal {
    Signal::failure(model, 0.0)
}

/// One Signal per model, all agreeing at the same crisis_signal level.
pub fn unanimous_signals(crisis_signal: f64) -> Vec<Signal> {
    ModelName::ALL
        .iter()
        .map(|m| sample_signal(*m, crisis_signal))
        .collect()
}

/// A history item `minutes_ago` minutes before `now`, with the given score.
pub fn history_item(now: DateTime<Utc>, minutes_ago: i64, crisis_score: f64) -> HistoryItem {
    HistoryItem {
        message: format!("message from {minutes_ago} minutes ago"),
        timestamp: now - ChronoDuration::minutes(minutes_ago),
        crisis_score: Some(crisis_score),
        message_id: None,
    }
}

/// A strictly-increasing-timestamp escalating history: scores climb from
/// `start` to `end` across `count` messages, most recent last.
pub fn escalating_history(now: DateTime<Utc>, count: usize, start: f64, end: f64) -> Vec<HistoryItem> {
    (0..count)
        .map(|i| {
            let frac = if count <= 1 {
                1.0
            } else {
                i as f64 / (count - 1) as f64
            };
            let score = start + (end - start) * frac;
            let minutes_ago = (count - 1 - i) as i64 * 10;
            history_item(now, minutes_ago, score)
        })
        .collect()
}

/// The default runtime config, for tests that only care about one field.
pub fn default_config() -> ConfigView {
    ConfigView::default()
}
