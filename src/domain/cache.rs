//! Quote Cache
//!
//! Asymmetric TTL cache for resolved quotes, keyed by `network:pair`.
//! - Positive entries (a quote): short TTL, prices move continuously
//! - Negative entries (pair known unresolvable): longer TTL, absence from a
//!   provider rarely changes quickly
//!
//! A cached `None` is a valid hit and must be distinguishable from the key
//! not being present at all; `Lookup` encodes that. Expiry is lazy, on read.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::domain::quote::Quote;

/// Result of a cache read.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// A prior fetch resolved this key: `Some(quote)` or a negative `None`
    Hit(Option<Quote>),
    /// Never fetched, or the entry expired
    Miss,
}

/// Cache entry with TTL tracking. Immutable once written; a fresh insert
/// overwrites.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: Option<Quote>,
    pub inserted_at: Instant,
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn new(value: Option<Quote>, ttl: Duration) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
            ttl,
        }
    }

    /// Check if the entry is still valid
    pub fn is_valid(&self) -> bool {
        self.inserted_at.elapsed() < self.ttl
    }
}

/// In-memory quote cache shared by every fetch path.
#[derive(Debug)]
pub struct QuoteCache {
    entries: HashMap<String, CacheEntry>,
    /// TTL for positive entries
    quote_ttl: Duration,
    /// TTL for negative entries
    negative_ttl: Duration,
    /// Maximum entries before cleanup
    max_entries: usize,
}

impl QuoteCache {
    /// Default TTL for a resolved quote (45 seconds)
    pub const DEFAULT_QUOTE_TTL: Duration = Duration::from_millis(45_000);
    /// Default TTL for a negative entry (60 seconds)
    pub const DEFAULT_NEGATIVE_TTL: Duration = Duration::from_millis(60_000);
    /// Default max cache entries
    pub const DEFAULT_MAX_ENTRIES: usize = 4096;

    pub fn new() -> Self {
        Self::with_config(
            Self::DEFAULT_QUOTE_TTL,
            Self::DEFAULT_NEGATIVE_TTL,
            Self::DEFAULT_MAX_ENTRIES,
        )
    }

    pub fn with_config(quote_ttl: Duration, negative_ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quote_ttl,
            negative_ttl,
            max_entries,
        }
    }

    fn key(network: &str, pair: &str) -> String {
        format!("{}:{}", network, pair)
    }

    /// Look up a pair. Expired entries read as `Miss`.
    pub fn get(&self, network: &str, pair: &str) -> Lookup {
        match self
            .entries
            .get(&Self::key(network, pair))
            .filter(|entry| entry.is_valid())
        {
            Some(entry) => Lookup::Hit(entry.value.clone()),
            None => Lookup::Miss,
        }
    }

    /// Record a fetch outcome. The TTL is picked by polarity: quotes get the
    /// short TTL, negative results the longer one.
    pub fn insert(&mut self, network: &str, pair: &str, value: Option<Quote>) {
        if self.entries.len() >= self.max_entries {
            self.cleanup();
        }
        if self.entries.len() >= self.max_entries {
            self.remove_oldest();
        }

        let ttl = if value.is_some() {
            self.quote_ttl
        } else {
            self.negative_ttl
        };
        self.entries
            .insert(Self::key(network, pair), CacheEntry::new(value, ttl));
    }

    /// Drop expired entries
    pub fn cleanup(&mut self) {
        self.entries.retain(|_, entry| entry.is_valid());
    }

    fn remove_oldest(&mut self) {
        if let Some(oldest_key) = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.inserted_at)
            .map(|(key, _)| key.clone())
        {
            self.entries.remove(&oldest_key);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of entries, including expired ones
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of unexpired entries
    pub fn valid_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_valid()).count()
    }
}

impl Default for QuoteCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PAIR: &str = "0x3f0296bf652e19bca772ec3df08b32732f93014a";
    const OTHER: &str = "0x1111111111111111111111111111111111111111";

    fn quote(pair: &str) -> Quote {
        Quote::new("base", pair, 1.0, None, None, None, json!({})).unwrap()
    }

    #[test]
    fn test_insert_and_get_positive() {
        let mut cache = QuoteCache::new();
        cache.insert("base", PAIR, Some(quote(PAIR)));

        match cache.get("base", PAIR) {
            Lookup::Hit(Some(q)) => assert_eq!(q.pair, PAIR),
            other => panic!("expected positive hit, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_hit_distinct_from_miss() {
        let mut cache = QuoteCache::new();
        cache.insert("base", PAIR, None);

        // Cached "no quote" is a hit, an unknown key is a miss
        assert_eq!(cache.get("base", PAIR), Lookup::Hit(None));
        assert_eq!(cache.get("base", OTHER), Lookup::Miss);
    }

    #[test]
    fn test_asymmetric_ttl() {
        let quote_ttl = Duration::from_millis(20);
        let negative_ttl = Duration::from_millis(200);
        let mut cache = QuoteCache::with_config(quote_ttl, negative_ttl, 100);

        cache.insert("base", PAIR, Some(quote(PAIR)));
        cache.insert("base", OTHER, None);

        std::thread::sleep(Duration::from_millis(40));

        // Positive entry expired, negative entry still a hit
        assert_eq!(cache.get("base", PAIR), Lookup::Miss);
        assert_eq!(cache.get("base", OTHER), Lookup::Hit(None));
    }

    #[test]
    fn test_expired_entry_reads_as_miss() {
        let short = Duration::from_millis(10);
        let mut cache = QuoteCache::with_config(short, short, 100);

        cache.insert("base", PAIR, Some(quote(PAIR)));
        assert_ne!(cache.get("base", PAIR), Lookup::Miss);

        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get("base", PAIR), Lookup::Miss);
    }

    #[test]
    fn test_networks_do_not_collide() {
        let mut cache = QuoteCache::new();
        cache.insert("base", PAIR, Some(quote(PAIR)));

        assert_eq!(cache.get("ethereum", PAIR), Lookup::Miss);
    }

    #[test]
    fn test_fresh_insert_overwrites() {
        let mut cache = QuoteCache::new();
        cache.insert("base", PAIR, None);
        cache.insert("base", PAIR, Some(quote(PAIR)));

        assert!(matches!(cache.get("base", PAIR), Lookup::Hit(Some(_))));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cleanup_drops_expired() {
        let short = Duration::from_millis(10);
        let mut cache = QuoteCache::with_config(short, short, 100);

        for i in 0..5 {
            cache.insert("base", &format!("0x{:040x}", i), None);
        }
        assert_eq!(cache.len(), 5);

        std::thread::sleep(Duration::from_millis(20));
        cache.cleanup();
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_max_entries_bound() {
        let long = Duration::from_secs(60);
        let mut cache = QuoteCache::with_config(long, long, 3);

        for i in 0..6 {
            cache.insert("base", &format!("0x{:040x}", i), None);
        }
        assert!(cache.len() <= 3);
    }
}
