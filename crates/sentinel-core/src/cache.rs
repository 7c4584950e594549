// ABOUTME: Response Cache: bounded LRU with per-entry TTL
use dashmap::DashMap;
use sentinel_types::CacheEntry;
use std::hash::{Hash, Hasher};
use std::time::Duration;
use std::collections::hash_map::DefaultHasher;

#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
}

/// Stable hash over the pieces of the request + Config View that affect
/// the answer. Stable within one process
/// lifetime; not guaranteed stable across builds or restarts.
pub fn fingerprint(
    normalized_text: &str,
    verbosity: &str,
    resolution_strategy: &str,
    consensus_algorithm: &str,
) -> u64 {
    let mut hasher = DefaultHasher::new();
    normalized_text.hash(&mut hasher);
    verbosity.hash(&mut hasher);
    resolution_strategy.hash(&mut hasher);
    consensus_algorithm.hash(&mut hasher);
    hasher.finish()
}

pub struct ResponseCache<T: Clone + Send + Sync> {
    entries: DashMap<u64, CacheEntry<T>>,
    capacity: usize,
    default_ttl: Duration,
    hits: std::sync::atomic::AtomicU64,
    misses: std::sync::atomic::AtomicU64,
    evictions: std::sync::atomic::AtomicU64,
    expirations: std::sync::atomic::AtomicU64,
}

impl<T: Clone + Send + Sync> ResponseCache<T> {
    pub fn new(capacity: usize, default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::with_capacity(capacity),
            capacity,
            default_ttl,
            hits: Default::default(),
            misses: Default::default(),
            evictions: Default::default(),
            expirations: Default::default(),
        }
    }

    /// Lookup by fingerprint. A lazily-expired entry counts as absent and
    /// is removed on the spot.
    pub fn get(&self, key: u64) -> Option<T> {
        use std::sync::atomic::Ordering::Relaxed;
        if let Some(mut entry) = self.entries.get_mut(&key) {
            if entry.is_expired() {
                drop(entry);
                self.entries.remove(&key);
                self.expirations.fetch_add(1, Relaxed);
                self.misses.fetch_add(1, Relaxed);
                return None;
            }
            entry.touch();
            self.hits.fetch_add(1, Relaxed);
            return Some(entry.response.clone());
        }
        self.misses.fetch_add(1, Relaxed);
        None
    }

    pub fn put(&self, key: u64, response: T) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.evict_least_recently_used();
        }
        self.entries
            .insert(key, CacheEntry::new(key, response, self.default_ttl));
    }

    fn evict_least_recently_used(&self) {
        use std::sync::atomic::Ordering::Relaxed;
        let victim = self
            .entries
            .iter()
            .min_by_key(|e| e.last_accessed())
            .map(|e| *e.key());
        if let Some(key) = victim {
            self.entries.remove(&key);
            self.evictions.fetch_add(1, Relaxed);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        use std::sync::atomic::Ordering::Relaxed;
        CacheStats {
            hits: self.hits.load(Relaxed),
            misses: self.misses.load(Relaxed),
            evictions: self.evictions.load(Relaxed),
            expirations: self.expirations.load(Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_after_put_hits() {
        let cache: ResponseCache<String> = ResponseCache::new(4, Duration::from_secs(60));
        cache.put(1, "hello".to_string());
        assert_eq!(cache.get(1), Some("hello".to_string()));
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn miss_on_unknown_key() {
        let cache: ResponseCache<String> = ResponseCache::new(4, Duration::from_secs(60));
        assert_eq!(cache.get(42), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn evicts_when_over_capacity() {
        let cache: ResponseCache<u32> = ResponseCache::new(2, Duration::from_secs(60));
        cache.put(1, 10);
        cache.put(2, 20);
        cache.get(1); // touch 1 so it's more recent than 2
        cache.put(3, 30);
        assert_eq!(cache.len(), 2);
        assert!(cache.get(2).is_none() || cache.get(1).is_some());
    }

    #[test]
    fn expired_entry_treated_as_absent() {
        let cache: ResponseCache<u32> = ResponseCache::new(4, Duration::from_millis(1));
        cache.put(1, 99);
        std::thread::sleep(Duration::from_millis(10));
        assert_eq!(cache.get(1), None);
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn fingerprint_is_stable_for_identical_inputs() {
        let a = fingerprint("hello", "standard", "conservative", "weighted_voting");
        let b = fingerprint("hello", "standard", "conservative", "weighted_voting");
        assert_eq!(a, b);
    }

    #[test]
    fn fingerprint_differs_on_verbosity() {
        let a = fingerprint("hello", "standard", "conservative", "weighted_voting");
        let b = fingerprint("hello", "detailed", "conservative", "weighted_voting");
        assert_ne!(a, b);
    }
}
