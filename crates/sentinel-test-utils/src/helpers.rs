// ABOUTME: Assertion helpers for response envelopes and Assessments
use sentinel_core::response::AnalyzeResponse;
use sentinel_types::{Assessment, Severity};

/// Basic envelope sanity: score and confidence are fractions, severity
/// matches the `crisis_detected` flag the way the Scoring Kernel derives it.
pub fn assert_response_well_formed(response: &AnalyzeResponse) {
    assert!((0.0..=1.0).contains(&response.crisis_score));
    assert!((0.0..=1.0).contains(&response.confidence));
    if response.severity == Severity::Safe {
        assert!(!response.crisis_detected);
    }
    assert!(!response.request_id.is_empty());
}

/// Basic Assessment sanity, for tests exercising the Scoring Kernel directly.
/// `is_crisis` is left unchecked against severity here: consensus algorithms
/// other than the default may override it by vote count instead.
pub fn assert_assessment_well_formed(assessment: &Assessment) {
    assert!((0.0..=1.0).contains(&assessment.crisis_score));
    assert!((0.0..=1.0).contains(&assessment.confidence));
}
