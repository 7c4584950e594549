// ABOUTME: Response cache entry shape
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub fingerprint: u64,
    pub response: T,
    pub created_at: Instant,
    pub ttl: Duration,
    last_accessed: Instant,
}

impl<T> CacheEntry<T> {
    pub fn new(fingerprint: u64, response: T, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            fingerprint,
            response,
            created_at: now,
            ttl,
            last_accessed: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }

    pub fn touch(&mut self) {
        self.last_accessed = Instant::now();
    }

    pub fn last_accessed(&self) -> Instant {
        self.last_accessed
    }
}
