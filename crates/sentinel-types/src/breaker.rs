// ABOUTME: Per-model circuit breaker state
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerStatus {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone)]
pub struct BreakerState {
    pub status: BreakerStatus,
    pub consecutive_failures: usize,
    pub opened_at: Option<Instant>,
    pub half_open_probes_remaining: usize,
}

impl Default for BreakerState {
    fn default() -> Self {
        Self {
            status: BreakerStatus::Closed,
            consecutive_failures: 0,
            opened_at: None,
            half_open_probes_remaining: 0,
        }
    }
}
