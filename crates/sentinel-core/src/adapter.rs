// ABOUTME: Request Adapter + History Validator: validation and normalization
use chrono::{DateTime, Utc};
use sentinel_types::{
    ConsensusAlgorithm, Diagnostics, HistoryItem, ResolutionStrategy, ValidationError,
};

pub const HARD_MESSAGE_CAP: usize = 10_000;
pub const MAX_HISTORY_ITEMS: usize = 20;

/// Wire-level history item before timestamp parsing.
#[derive(Debug, Clone)]
pub struct RawHistoryItem {
    pub message: String,
    pub timestamp: String,
    pub crisis_score: Option<f64>,
    pub message_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NormalizedRequest {
    pub message: String,
    pub was_truncated: bool,
    pub history: Vec<HistoryItem>,
    pub user_timezone: Option<String>,
    pub verbosity: String,
    pub consensus_algorithm: Option<ConsensusAlgorithm>,
    pub resolution_strategy: Option<ResolutionStrategy>,
    pub diagnostics: Diagnostics,
}

/// Validates and normalizes `message`. `platform_cap` is the
/// upstream chat platform's character limit (default 2000); `enforce_cap`
/// makes exceeding it a hard validation failure instead of a truncation.
pub fn validate_message(
    message: &str,
    platform_cap: usize,
    enforce_cap: bool,
) -> Result<(String, bool), ValidationError> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyMessage);
    }
    let len = trimmed.chars().count();
    if len > HARD_MESSAGE_CAP {
        return Err(ValidationError::MessageTooLong {
            max: HARD_MESSAGE_CAP,
            actual: len,
        });
    }
    if len > platform_cap {
        if enforce_cap {
            return Err(ValidationError::MessageTooLong {
                max: platform_cap,
                actual: len,
            });
        }
        return Ok((smart_truncate(trimmed, platform_cap), true));
    }
    Ok((trimmed.to_string(), false))
}

/// Truncates at the last sentence boundary (`.`, `!`, `?`) at or before
/// `max_len` characters; falls back to a hard cut if none is found.
fn smart_truncate(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        return s.to_string();
    }
    let window = &chars[..max_len];
    if let Some(idx) = window
        .iter()
        .rposition(|c| *c == '.' || *c == '!' || *c == '?')
    {
        chars[..=idx].iter().collect()
    } else {
        chars[..max_len].iter().collect()
    }
}

/// Parses and validates `message_history`: at most 20 items, each
/// with a parseable ISO-8601 timestamp, strictly increasing, each
/// `crisis_score` in [0,1]. Items are already expected in wire order;
/// the result is sorted by timestamp ascending.
pub fn validate_history(raw: &[RawHistoryItem]) -> Result<Vec<HistoryItem>, ValidationError> {
    if raw.len() > MAX_HISTORY_ITEMS {
        return Err(ValidationError::HistoryTooLong {
            actual: raw.len(),
            max: MAX_HISTORY_ITEMS,
        });
    }

    let mut items = Vec::with_capacity(raw.len());
    for (index, item) in raw.iter().enumerate() {
        let timestamp: DateTime<Utc> = item
            .timestamp
            .parse()
            .map_err(|_| ValidationError::BadHistoryTimestamp {
                index,
                raw: item.timestamp.clone(),
            })?;
        if let Some(score) = item.crisis_score {
            if !(0.0..=1.0).contains(&score) {
                return Err(ValidationError::HistoryScoreOutOfRange { index, value: score });
            }
        }
        items.push(HistoryItem {
            message: item.message.clone(),
            timestamp,
            crisis_score: item.crisis_score,
            message_id: item.message_id.clone(),
        });
    }

    for i in 1..items.len() {
        if items[i].timestamp <= items[i - 1].timestamp {
            return Err(ValidationError::HistoryNotMonotonic { index: i });
        }
    }

    Ok(items)
}

pub fn validate_verbosity(raw: Option<&str>) -> Result<String, ValidationError> {
    match raw {
        None => Ok("standard".to_string()),
        Some(v) if v.parse::<crate::config::Verbosity>().is_ok() => Ok(v.to_string()),
        Some(v) => Err(ValidationError::InvalidVerbosity(v.to_string())),
    }
}

pub fn validate_consensus_algorithm(
    raw: Option<&str>,
) -> Result<Option<ConsensusAlgorithm>, ValidationError> {
    match raw {
        None => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| ValidationError::InvalidConsensusAlgorithm(v.to_string())),
    }
}

pub fn validate_resolution_strategy(
    raw: Option<&str>,
) -> Result<Option<ResolutionStrategy>, ValidationError> {
    match raw {
        None => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| ValidationError::InvalidResolutionStrategy(v.to_string())),
    }
}

/// Full request validation pipeline. `user_timezone` is
/// accepted as-is here; IANA-name validity is checked by the Context
/// Analyzer (`context::resolve_timezone`), which degrades to a warning
/// rather than a hard failure.
#[allow(clippy::too_many_arguments)]
pub fn validate_and_normalize(
    message: &str,
    platform_cap: usize,
    enforce_cap: bool,
    raw_history: &[RawHistoryItem],
    user_timezone: Option<&str>,
    verbosity: Option<&str>,
    consensus_algorithm: Option<&str>,
    resolution_strategy: Option<&str>,
) -> Result<NormalizedRequest, ValidationError> {
    let (message, was_truncated) = validate_message(message, platform_cap, enforce_cap)?;
    let history = validate_history(raw_history)?;
    let verbosity = validate_verbosity(verbosity)?;
    let consensus_algorithm = validate_consensus_algorithm(consensus_algorithm)?;
    let resolution_strategy = validate_resolution_strategy(resolution_strategy)?;

    Ok(NormalizedRequest {
        message,
        was_truncated,
        history,
        user_timezone: user_timezone.map(str::to_string),
        verbosity,
        consensus_algorithm,
        resolution_strategy,
        diagnostics: Diagnostics {
            warnings: Vec::new(),
            was_truncated,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_message_is_rejected() {
        assert_eq!(
            validate_message("   ", 2000, false),
            Err(ValidationError::EmptyMessage)
        );
    }

    #[test]
    fn exactly_platform_cap_is_not_truncated() {
        let msg = "a".repeat(2000);
        let (out, truncated) = validate_message(&msg, 2000, false).unwrap();
        assert!(!truncated);
        assert_eq!(out.chars().count(), 2000);
    }

    #[test]
    fn over_cap_smart_truncates_when_not_enforced() {
        let msg = format!("{}. {}", "a".repeat(1990), "b".repeat(20));
        let (out, truncated) = validate_message(&msg, 2000, false).unwrap();
        assert!(truncated);
        assert!(out.len() <= msg.len());
    }

    #[test]
    fn over_cap_rejected_when_enforced() {
        let msg = "a".repeat(2001);
        let result = validate_message(&msg, 2000, true);
        assert!(matches!(result, Err(ValidationError::MessageTooLong { .. })));
    }

    #[test]
    fn over_hard_cap_always_rejected() {
        let msg = "a".repeat(10_001);
        let result = validate_message(&msg, 2000, false);
        assert!(matches!(
            result,
            Err(ValidationError::MessageTooLong { max: HARD_MESSAGE_CAP, .. })
        ));
    }

    fn raw(ts: &str, score: Option<f64>) -> RawHistoryItem {
        RawHistoryItem {
            message: "m".to_string(),
            timestamp: ts.to_string(),
            crisis_score: score,
            message_id: None,
        }
    }

    #[test]
    fn history_within_bounds_is_accepted() {
        let items = vec![
            raw("2026-01-01T00:00:00Z", Some(0.1)),
            raw("2026-01-01T01:00:00Z", Some(0.2)),
        ];
        assert!(validate_history(&items).is_ok());
    }

    #[test]
    fn history_over_twenty_items_rejected() {
        let items: Vec<RawHistoryItem> = (0..21)
            .map(|i| raw(&format!("2026-01-01T{:02}:00:00Z", i % 24), None))
            .collect();
        assert!(matches!(
            validate_history(&items),
            Err(ValidationError::HistoryTooLong { .. })
        ));
    }

    #[test]
    fn non_monotonic_history_rejected() {
        let items = vec![
            raw("2026-01-01T02:00:00Z", None),
            raw("2026-01-01T01:00:00Z", None),
        ];
        assert!(matches!(
            validate_history(&items),
            Err(ValidationError::HistoryNotMonotonic { index: 1 })
        ));
    }

    #[test]
    fn unparseable_timestamp_rejected() {
        let items = vec![raw("not-a-date", None)];
        assert!(matches!(
            validate_history(&items),
            Err(ValidationError::BadHistoryTimestamp { index: 0, .. })
        ));
    }

    #[test]
    fn history_score_out_of_range_rejected() {
        let items = vec![raw("2026-01-01T00:00:00Z", Some(1.5))];
        assert!(matches!(
            validate_history(&items),
            Err(ValidationError::HistoryScoreOutOfRange { index: 0, .. })
        ));
    }

    #[test]
    fn unknown_consensus_algorithm_rejected() {
        assert!(matches!(
            validate_consensus_algorithm(Some("quorum")),
            Err(ValidationError::InvalidConsensusAlgorithm(_))
        ));
    }
}
