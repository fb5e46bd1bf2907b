//! In-memory quote cache.
//!
//! Entries live for a fixed TTL from the moment they are stored and are only
//! replaced, never swept: an expired entry reads as a miss and is overwritten
//! by the next successful fetch. Growth is bounded by the number of distinct
//! pairs requested.

use dashmap::DashMap;
use rates_types::{Pair, Quote};
use tokio::time::{Duration, Instant};

/// How long a fetched quote stays valid.
pub const QUOTE_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// A stored quote and the instant it stops being served.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedQuote {
    pub quote: Quote,
    pub expires_at: Instant,
}

impl CachedQuote {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Quote cache keyed by directional pair.
///
/// Concurrent misses on the same pair are not de-duplicated; each caller
/// fetches and the last `put` wins.
pub struct QuoteCache {
    entries: DashMap<Pair, CachedQuote>,
    ttl: Duration,
}

impl Default for QuoteCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteCache {
    pub fn new() -> Self {
        Self::with_ttl(QUOTE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached quote for `pair`, unless missing or expired.
    pub fn get(&self, pair: &Pair) -> Option<Quote> {
        let entry = self.entries.get(pair)?;
        if entry.is_expired(Instant::now()) {
            return None;
        }
        Some(entry.quote)
    }

    /// Stores `quote`, replacing whatever was cached for `pair`.
    pub fn put(&self, pair: Pair, quote: Quote) -> CachedQuote {
        let cached = CachedQuote {
            quote,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.insert(pair, cached);
        cached
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_hit_within_ttl() {
        let cache = QuoteCache::new();
        let pair = Pair::new("USD", "EUR");
        cache.put(pair.clone(), Quote::new(0.92, Some(0.1)));

        tokio::time::advance(QUOTE_TTL - Duration::from_millis(1)).await;

        assert_eq!(cache.get(&pair), Some(Quote::new(0.92, Some(0.1))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_at_ttl() {
        let cache = QuoteCache::new();
        let pair = Pair::new("USD", "EUR");
        let stored = cache.put(pair.clone(), Quote::new(0.92, None));

        tokio::time::advance(QUOTE_TTL).await;

        assert!(stored.is_expired(Instant::now()));
        assert_eq!(cache.get(&pair), None);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_put_after_expiry_overwrites() {
        let cache = QuoteCache::new();
        let pair = Pair::new("USD", "EUR");
        cache.put(pair.clone(), Quote::new(0.92, None));
        tokio::time::advance(QUOTE_TTL + Duration::from_millis(1)).await;

        cache.put(pair.clone(), Quote::new(0.93, None));

        assert_eq!(cache.get(&pair), Some(Quote::new(0.93, None)));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_pairs_are_directional() {
        let cache = QuoteCache::new();
        cache.put(Pair::new("USD", "EUR"), Quote::new(0.92, None));

        assert_eq!(cache.get(&Pair::new("EUR", "USD")), None);
        assert!(cache.get(&Pair::new("USD", "EUR")).is_some());
    }
}
