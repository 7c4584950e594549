// ABOUTME: Context Analyzer: escalation, temporal risk, intervention urgency
// Written in the Scoring Kernel's pure-function idiom: no clock reads other
// than the caller-supplied `now`, no I/O, no shared mutable state.
use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;
use sentinel_types::{
    EscalationPattern, EscalationRate, HistoryItem, Intervention, InterventionUrgency,
    TemporalFactors, Trajectory, Trend, TrendDirection,
};
use sentinel_types::Severity;

/// Escalation rate: `delta / span_hours` bucketed into
/// `rapid / gradual / stable / improving`, or `none` with no scored history.
pub fn escalation_rate(current_score: f64, history: &[HistoryItem], now: DateTime<Utc>) -> (EscalationRate, f64) {
    let oldest_scored = history.iter().find_map(|h| h.crisis_score.map(|s| (h.timestamp, s)));
    let Some((oldest_ts, oldest_score)) = oldest_scored else {
        return (EscalationRate::None, 0.0);
    };
    let delta = current_score - oldest_score;
    let span_hours = ((now - oldest_ts).num_seconds() as f64 / 3600.0).max(0.1);
    let velocity = delta / span_hours;
    let rate = if velocity > 0.30 {
        EscalationRate::Rapid
    } else if velocity > 0.10 {
        EscalationRate::Gradual
    } else if velocity >= -0.05 {
        EscalationRate::Stable
    } else {
        EscalationRate::Improving
    };
    (rate, velocity)
}

fn coefficient_of_variation(deltas: &[f64]) -> f64 {
    if deltas.is_empty() {
        return f64::INFINITY;
    }
    let mean = deltas.iter().sum::<f64>() / deltas.len() as f64;
    if mean.abs() < 1e-9 {
        return f64::INFINITY;
    }
    let var = deltas.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / deltas.len() as f64;
    var.sqrt() / mean.abs()
}

/// Pattern classification from history scores plus current score.
pub fn classify_pattern(
    scores: &[f64],
    rate: EscalationRate,
) -> (EscalationPattern, f64) {
    if scores.len() < 2 {
        return (EscalationPattern::None, 0.0);
    }
    let deltas: Vec<f64> = scores.windows(2).map(|w| w[1] - w[0]).collect();
    let total_variation: f64 = deltas.iter().map(|d| d.abs()).sum();

    let pattern = if let Some(max_abs_delta) = deltas.iter().map(|d| d.abs()).fold(None, |acc: Option<f64>, v| {
        Some(acc.map_or(v, |a: f64| a.max(v)))
    }) {
        if total_variation > 0.0 && max_abs_delta > 0.4 && max_abs_delta / total_variation > 0.5 {
            EscalationPattern::Spike
        } else if deltas.len() >= 2
            && deltas.windows(2).all(|w| w[1].abs() > w[0].abs() * 1.3)
            && deltas.iter().all(|d| *d > 0.0)
        {
            EscalationPattern::Exponential
        } else if coefficient_of_variation(&deltas) < 0.25 && deltas.iter().all(|d| *d > 0.0) {
            EscalationPattern::Linear
        } else if rate == EscalationRate::Stable && scores.iter().all(|s| *s > 0.5) {
            EscalationPattern::Plateau
        } else {
            let sign_changes = deltas
                .windows(2)
                .filter(|w| (w[0] > 0.0) != (w[1] > 0.0))
                .count();
            if sign_changes >= 2 {
                EscalationPattern::Oscillating
            } else {
                EscalationPattern::None
            }
        }
    } else {
        EscalationPattern::None
    };

    let confidence = if pattern == EscalationPattern::None {
        0.0
    } else {
        (scores.len() as f64 / 5.0).min(1.0)
    };
    (pattern, confidence)
}

pub fn trend_direction(rate: EscalationRate, pattern: EscalationPattern) -> TrendDirection {
    match (rate, pattern) {
        (_, EscalationPattern::Oscillating) => TrendDirection::Volatile,
        (EscalationRate::Rapid, _) | (EscalationRate::Gradual, _) => TrendDirection::Escalating,
        (EscalationRate::Improving, _) => TrendDirection::Improving,
        _ => TrendDirection::Stable,
    }
}

/// Temporal risk factors at `now`, converted to `tz`.
pub fn temporal_factors(
    now: DateTime<Utc>,
    history: &[HistoryItem],
    tz: Tz,
    timezone_used: String,
) -> TemporalFactors {
    let local = now.with_timezone(&tz);
    let hour = local.hour();
    let late_night_risk = (22..=23).contains(&hour) || (0..=3).contains(&hour);
    let is_weekend = matches!(
        local.weekday(),
        chrono::Weekday::Sat | chrono::Weekday::Sun
    );

    let rapid_posting = if history.len() >= 5 {
        let last_five = &history[history.len() - 5..];
        let span = last_five.last().unwrap().timestamp - last_five.first().unwrap().timestamp;
        span.num_seconds() <= 30 * 60
    } else {
        false
    };

    let mut modifier: f64 = 1.0;
    if late_night_risk {
        modifier *= 1.2;
    }
    if is_weekend {
        modifier *= 1.1;
    }
    if rapid_posting {
        modifier *= 1.15;
    }
    let time_risk_modifier = modifier.clamp(1.0, 1.5);

    TemporalFactors {
        late_night_risk,
        rapid_posting,
        is_weekend,
        hour_of_day: hour,
        time_risk_modifier,
        timezone_used,
    }
}

/// Intervention urgency table.
pub fn intervention_urgency(
    severity: Severity,
    rate: EscalationRate,
    late_night_risk: bool,
) -> InterventionUrgency {
    match severity {
        Severity::Critical => InterventionUrgency::Immediate,
        Severity::High if matches!(rate, EscalationRate::Rapid | EscalationRate::Gradual) => {
            InterventionUrgency::High
        }
        Severity::High => InterventionUrgency::Standard,
        Severity::Medium if late_night_risk => InterventionUrgency::High,
        Severity::Medium => InterventionUrgency::Standard,
        Severity::Low if rate == EscalationRate::Rapid => InterventionUrgency::Low,
        _ => InterventionUrgency::None,
    }
}

pub fn trajectory(scores: &[f64], current_score: f64) -> Trajectory {
    let mut all = scores.to_vec();
    all.push(current_score);
    let peak = all.iter().cloned().fold(f64::MIN, f64::max);
    Trajectory {
        start_score: all.first().copied().unwrap_or(current_score),
        end_score: current_score,
        peak_score: peak,
        scores: all,
    }
}

pub fn build_trend(delta: f64, velocity: f64, span_hours: f64, rate: EscalationRate, pattern: EscalationPattern) -> Trend {
    Trend {
        direction: trend_direction(rate, pattern),
        velocity,
        score_delta: delta,
        time_span_hours: span_hours,
    }
}

pub fn build_intervention(
    urgency: InterventionUrgency,
    rate: EscalationRate,
) -> Intervention {
    let intervention_delayed = urgency == InterventionUrgency::None && rate == EscalationRate::Rapid;
    let reason = match urgency {
        InterventionUrgency::Immediate => "severity is critical".to_string(),
        InterventionUrgency::High => "escalation is rapid or occurring late at night".to_string(),
        InterventionUrgency::Standard => "severity warrants standard monitoring".to_string(),
        InterventionUrgency::Low => "low severity but rapid escalation observed".to_string(),
        InterventionUrgency::None => "no elevated risk signals".to_string(),
    };
    Intervention {
        urgency,
        recommended_point: None,
        intervention_delayed,
        reason,
    }
}

/// Resolves the effective IANA timezone: the request's `user_timezone` if
/// it parses, else the configured default, else UTC.
/// Returns a diagnostic warning when the requested zone was invalid.
pub fn resolve_timezone(requested: Option<&str>, default_timezone: &str) -> (Tz, String, Option<String>) {
    if let Some(name) = requested {
        if let Ok(tz) = name.parse::<Tz>() {
            return (tz, name.to_string(), None);
        }
        let warning = format!("user_timezone {name:?} is not a recognized IANA zone, falling back to default");
        let (tz, used, _) = resolve_timezone(None, default_timezone);
        return (tz, used, Some(warning));
    }
    match default_timezone.parse::<Tz>() {
        Ok(tz) => (tz, default_timezone.to_string(), None),
        Err(_) => (chrono_tz::UTC, "UTC".to_string(), None),
    }
}

/// Builds the full Context Analyzer output for one request.
/// `history` must already be validated and sorted ascending by timestamp.
/// Returns the report plus any diagnostic warnings (e.g. an invalid
/// timezone) so the caller can surface them without affecting scoring.
pub fn analyze(
    current_score: f64,
    current_severity: Severity,
    history: &[HistoryItem],
    user_timezone: Option<&str>,
    default_timezone: &str,
    now: DateTime<Utc>,
) -> (sentinel_types::ContextReport, Vec<String>) {
    let mut warnings = Vec::new();
    let (tz, timezone_used, tz_warning) = resolve_timezone(user_timezone, default_timezone);
    if let Some(w) = tz_warning {
        warnings.push(w);
    }

    let (rate, velocity) = escalation_rate(current_score, history, now);
    let oldest_scored = history.iter().find_map(|h| h.crisis_score.map(|_| h.timestamp));
    let span_hours = oldest_scored
        .map(|ts| ((now - ts).num_seconds() as f64 / 3600.0).max(0.1))
        .unwrap_or(0.0);
    let delta = history
        .iter()
        .find_map(|h| h.crisis_score)
        .map(|oldest| current_score - oldest)
        .unwrap_or(0.0);

    let mut history_scores: Vec<f64> = history.iter().filter_map(|h| h.crisis_score).collect();
    history_scores.push(current_score);
    let (pattern, pattern_confidence) = classify_pattern(&history_scores, rate);

    let temporal = temporal_factors(now, history, tz, timezone_used);
    let urgency = intervention_urgency(current_severity, rate, temporal.late_night_risk);
    let trend = build_trend(delta, velocity, span_hours, rate, pattern);
    let intervention = build_intervention(urgency, rate);
    let traj = trajectory(
        &history.iter().filter_map(|h| h.crisis_score).collect::<Vec<_>>(),
        current_score,
    );

    let report = sentinel_types::ContextReport {
        escalation_detected: rate != EscalationRate::None && delta > 0.0,
        escalation_rate: rate,
        escalation_pattern: pattern,
        pattern_confidence,
        trend,
        temporal_factors: temporal,
        trajectory: traj,
        intervention,
        history_analyzed: sentinel_types::HistoryAnalyzed {
            message_count: history.len(),
            time_span_hours: span_hours,
            oldest_timestamp: history.first().map(|h| h.timestamp),
            newest_timestamp: history.last().map(|h| h.timestamp),
        },
    };

    (report, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn hist(score: f64, minutes_ago: i64, now: DateTime<Utc>) -> HistoryItem {
        HistoryItem {
            message: "prior".to_string(),
            timestamp: now - ChronoDuration::minutes(minutes_ago),
            crisis_score: Some(score),
            message_id: None,
        }
    }

    #[test]
    fn escalation_rate_none_without_scored_history() {
        let now = Utc::now();
        let history = vec![HistoryItem {
            message: "x".to_string(),
            timestamp: now - ChronoDuration::hours(1),
            crisis_score: None,
            message_id: None,
        }];
        let (rate, _) = escalation_rate(0.5, &history, now);
        assert_eq!(rate, EscalationRate::None);
    }

    #[test]
    fn escalation_rate_rapid_on_steep_rise() {
        let now = Utc::now();
        let history = vec![hist(0.1, 60, now)];
        let (rate, _) = escalation_rate(0.8, &history, now);
        assert_eq!(rate, EscalationRate::Rapid);
    }

    #[test]
    fn late_night_risk_detected_in_user_timezone() {
        // 2026-07-27T03:00:00Z is EDT (UTC-4) in July, i.e. 23:00 local.
        let now = Utc.with_ymd_and_hms(2026, 7, 27, 3, 0, 0).unwrap();
        let tz: Tz = "America/New_York".parse().unwrap();
        let factors = temporal_factors(now, &[], tz, "America/New_York".to_string());
        assert!(factors.late_night_risk);
    }

    #[test]
    fn intervention_urgency_critical_is_immediate() {
        assert_eq!(
            intervention_urgency(Severity::Critical, EscalationRate::Stable, false),
            InterventionUrgency::Immediate
        );
    }

    #[test]
    fn intervention_urgency_medium_late_night_is_high() {
        assert_eq!(
            intervention_urgency(Severity::Medium, EscalationRate::Stable, true),
            InterventionUrgency::High
        );
    }

    #[test]
    fn invalid_timezone_falls_back_with_warning() {
        let (tz, used, warning) = resolve_timezone(Some("Not/AZone"), "UTC");
        assert_eq!(tz, chrono_tz::UTC);
        assert_eq!(used, "UTC");
        assert!(warning.is_some());
    }

    #[test]
    fn scenario_s4_escalating_history_triggers_context() {
        // America/New_York is UTC-4 in July (EDT); 03:00 UTC is 23:00 local.
        let now = Utc.with_ymd_and_hms(2026, 7, 28, 3, 0, 0).unwrap();
        let history = vec![
            hist(0.35, 120, now),
            hist(0.45, 90, now),
            hist(0.62, 30, now),
        ];
        let (report, _) = analyze(0.75, Severity::High, &history, Some("America/New_York"), "UTC", now);
        assert!(matches!(
            report.escalation_rate,
            EscalationRate::Rapid | EscalationRate::Gradual
        ));
        assert!(report.temporal_factors.late_night_risk);
        assert!(report.temporal_factors.time_risk_modifier >= 1.2);
        assert!(matches!(
            report.intervention.urgency,
            InterventionUrgency::High | InterventionUrgency::Immediate
        ));
    }

    use chrono::TimeZone;
}
