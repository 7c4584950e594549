// ABOUTME: Error taxonomy for the crisis-detection ensemble
use thiserror::Error;

/// Top-level error taxonomy. Callers at the HTTP boundary match on these
/// variants directly to pick a status code, without re-deriving anything.
#[derive(Error, Debug, Clone)]
pub enum SentinelError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("all models failed for this request")]
    ServiceUnavailable,

    #[error("service not ready: {0}")]
    NotReady(String),

    #[error("internal invariant violated: {0}")]
    Internal(String),
}

/// Validation failures surfaced to the caller as HTTP 422.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("message must not be empty")]
    EmptyMessage,

    #[error("message exceeds hard cap of {max} characters (got {actual})")]
    MessageTooLong { max: usize, actual: usize },

    #[error("message_history has {actual} items, exceeding the cap of {max}")]
    HistoryTooLong { actual: usize, max: usize },

    #[error("message_history item at index {index} has an unparseable timestamp: {raw}")]
    BadHistoryTimestamp { index: usize, raw: String },

    #[error("message_history is not in strictly increasing timestamp order at index {index}")]
    HistoryNotMonotonic { index: usize },

    #[error("history crisis_score at index {index} is out of [0,1]: {value}")]
    HistoryScoreOutOfRange { index: usize, value: f64 },

    #[error("verbosity must be one of minimal|standard|detailed, got {0:?}")]
    InvalidVerbosity(String),

    #[error("consensus_algorithm {0:?} is not recognized")]
    InvalidConsensusAlgorithm(String),

    #[error("resolution_strategy {0:?} is not recognized")]
    InvalidResolutionStrategy(String),
}

/// Per-model failure category, used by the Fallback Controller to decide
/// whether a failure is retryable.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelError {
    #[error("model call timed out")]
    Timeout,
    #[error("model resource exhausted")]
    Resource,
    #[error("remote/network failure")]
    Remote,
    #[error("model configuration or load failure")]
    Fatal,
}

impl ModelError {
    /// Transient categories are retried by the Fallback Controller up to
    /// `R_max`; `Fatal` is not retried and opens the breaker immediately.
    pub fn is_transient(self) -> bool {
        !matches!(self, ModelError::Fatal)
    }
}

pub type Result<T> = std::result::Result<T, SentinelError>;
