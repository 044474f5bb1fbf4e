//! Shared TTL cache for live intraday prices.
//!
//! The outer service consults this when assembling the `current_price`
//! overlay; the evaluation core itself never reads it. Readers tolerate
//! concurrent writers, and a stale-but-within-TTL read is acceptable.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Thread-safe ticker → price map with per-entry freshness.
pub struct PriceCache {
    ttl: Duration,
    inner: RwLock<HashMap<String, CachedPrice>>,
}

#[derive(Debug, Clone, Copy)]
struct CachedPrice {
    price: f64,
    fetched_at: Instant,
}

impl PriceCache {
    /// Default freshness window for intraday prices.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

    /// Cache with the default 60 s TTL.
    pub fn new() -> Self {
        Self::with_ttl(Self::DEFAULT_TTL)
    }

    /// Cache with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Price for the ticker if one is cached and still fresh.
    pub fn get(&self, ticker: &str) -> Option<f64> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let entry = map.get(ticker)?;
        if entry.fetched_at.elapsed() < self.ttl {
            Some(entry.price)
        } else {
            None
        }
    }

    /// Store a freshly fetched price, replacing any previous entry.
    pub fn set(&self, ticker: impl Into<String>, price: f64) {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.insert(
            ticker.into(),
            CachedPrice {
                price,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Drop entries whose TTL has lapsed.
    pub fn purge_expired(&self) {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.retain(|_, entry| entry.fetched_at.elapsed() < self.ttl);
    }
}

impl Default for PriceCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let cache = PriceCache::new();
        cache.set("AAPL", 187.5);
        assert_eq!(cache.get("AAPL"), Some(187.5));
        assert_eq!(cache.get("MSFT"), None);
    }

    #[test]
    fn test_overwrite() {
        let cache = PriceCache::new();
        cache.set("AAPL", 187.5);
        cache.set("AAPL", 188.25);
        assert_eq!(cache.get("AAPL"), Some(188.25));
    }

    #[test]
    fn test_zero_ttl_is_always_stale() {
        let cache = PriceCache::with_ttl(Duration::ZERO);
        cache.set("AAPL", 187.5);
        assert_eq!(cache.get("AAPL"), None);
    }

    #[test]
    fn test_purge_expired() {
        let cache = PriceCache::with_ttl(Duration::ZERO);
        cache.set("AAPL", 187.5);
        cache.purge_expired();
        // the entry is gone, not just masked
        let len = cache
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        assert_eq!(len, 0);
    }

    #[test]
    fn test_shared_across_threads() {
        let cache = std::sync::Arc::new(PriceCache::new());
        let writer = {
            let cache = cache.clone();
            std::thread::spawn(move || {
                for i in 0..100 {
                    cache.set("AAPL", 100.0 + i as f64);
                }
            })
        };
        for _ in 0..100 {
            let _ = cache.get("AAPL");
        }
        writer.join().unwrap();
        assert!(cache.get("AAPL").is_some());
    }
}
