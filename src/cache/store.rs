//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking, a byte
//! budget over estimated sizes, and TTL expiration. Single-threaded; see
//! [`BoundedCache`](crate::cache::BoundedCache) for the shared wrapper.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::cache::{
    default_estimator, CacheEntry, CacheStats, EstimateSize, LruTracker, MetricsSnapshot,
    SizeEstimator,
};
use crate::config::CacheConfig;

/// Accesses between periodic stats log lines
const STATS_LOG_EVERY: u64 = 100;

// == Put Outcome ==
/// Result of a put. Rejection is not an error: the key is simply absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// Entry admitted as most recently used
    Stored,
    /// Entry's estimate alone exceeds the byte budget; nothing was stored and
    /// any previous entry for the key is gone
    Rejected { size_bytes: u64, max_bytes: u64 },
    /// The cache holds zero entries; nothing was stored and any previous
    /// entry for the key is gone
    NoCapacity,
}

impl PutOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, PutOutcome::Stored)
    }
}

// == Cache Store ==
/// Cache storage bounded by entry count and estimated bytes, with LRU
/// eviction and TTL support.
pub struct CacheStore<K, V> {
    /// Key-value storage
    entries: HashMap<K, CacheEntry<V>>,
    /// LRU access tracker
    lru: LruTracker<K>,
    /// Performance statistics
    stats: CacheStats,
    /// Size policy applied at insertion
    estimator: SizeEstimator<V>,
    /// Sum of `size_bytes` over live entries
    total_bytes: u64,
    /// Last sequence number handed out
    sequence: u64,
    max_entries: usize,
    /// Normalized: `Some(0)` is stored as `None`
    max_bytes: Option<u64>,
    ttl: Option<Duration>,
}

impl<K, V> fmt::Debug for CacheStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("len", &self.entries.len())
            .field("total_bytes", &self.total_bytes)
            .field("max_entries", &self.max_entries)
            .field("max_bytes", &self.max_bytes)
            .field("ttl", &self.ttl)
            .field("stats", &self.stats)
            .finish()
    }
}

impl<K, V> CacheStore<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates a store sized by `config`, estimating values through their
    /// [`EstimateSize`] impl.
    pub fn new(config: &CacheConfig) -> Self
    where
        V: EstimateSize,
    {
        Self::with_estimator(config, default_estimator())
    }

    /// Creates a store with a caller-supplied size policy.
    pub fn with_estimator(config: &CacheConfig, estimator: SizeEstimator<V>) -> Self {
        Self {
            entries: HashMap::with_capacity(config.max_entries),
            lru: LruTracker::with_capacity(config.max_entries),
            stats: CacheStats::new(),
            estimator,
            total_bytes: 0,
            sequence: 0,
            max_entries: config.max_entries,
            max_bytes: config.byte_budget(),
            ttl: config.ttl,
        }
    }

    // == Put ==
    /// Stores a key-value pair as most recently used.
    ///
    /// Any existing entry for the key is removed first. A zero-capacity store
    /// admits nothing. If the new value's estimate exceeds the byte budget on
    /// its own it is rejected, leaving the key absent. Otherwise least recently used entries are evicted
    /// until both the byte budget and the entry count fit.
    pub fn put(&mut self, key: K, value: V) -> PutOutcome {
        let size_bytes = (self.estimator)(&value);

        self.remove_entry(&key);

        if self.max_entries == 0 {
            warn!("Cache has zero capacity, entry not stored");
            return PutOutcome::NoCapacity;
        }

        match self.max_bytes {
            Some(max_bytes) if size_bytes > max_bytes => {
                warn!(size_bytes, max_bytes, "Entry too large for cache, not stored");
                return PutOutcome::Rejected {
                    size_bytes,
                    max_bytes,
                };
            }
            Some(max_bytes) => {
                self.evict_until(max_bytes - size_bytes);
            }
            // Unbounded still has to fit the u64 running total
            None => {
                self.evict_until(u64::MAX - size_bytes);
            }
        }

        self.sequence += 1;
        let entry = CacheEntry::new(value, self.sequence, size_bytes);
        self.lru.push_front(key.clone());
        self.entries.insert(key, entry);
        self.total_bytes += size_bytes;

        while self.entries.len() > self.max_entries {
            if !self.evict_lru() {
                break;
            }
        }

        PutOutcome::Stored
    }

    // == Get ==
    /// Retrieves a clone of the value by key.
    ///
    /// Expired entries are removed and counted as misses. A hit makes the key
    /// most recently used.
    pub fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(self.ttl),
            None => {
                self.stats.record_miss();
                self.log_stats_periodically();
                return None;
            }
        };

        if expired {
            self.remove_entry(key);
            self.stats.record_miss();
            self.log_stats_periodically();
            return None;
        }

        self.stats.record_hit();
        self.lru.touch(key);
        self.log_stats_periodically();
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Remove ==
    /// Removes an entry by key, returning its value if it was still live.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let ttl = self.ttl;
        self.remove_entry(key)
            .filter(|entry| !entry.is_expired(ttl))
            .map(|entry| entry.value)
    }

    // == Clear ==
    /// Drops every entry and resets the statistics.
    pub fn clear(&mut self) {
        let dropped = self.entries.len();
        self.entries.clear();
        self.lru.clear();
        self.total_bytes = 0;
        self.stats.reset();
        debug!(dropped, "Cache cleared");
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        if self.ttl.is_none() {
            return 0;
        }

        let now = Instant::now();
        let ttl = self.ttl;
        let expired_keys: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now, ttl))
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();
        for key in expired_keys {
            self.remove_entry(&key);
        }

        if count > 0 {
            debug!(count, "Cleaned up expired entries");
        }
        count
    }

    // == Trim To ==
    /// Evicts least recently used entries until at most `target_bytes`
    /// remain accounted, or the cache is empty.
    pub fn trim_to(&mut self, target_bytes: u64) {
        let evicted = self.evict_until(target_bytes);
        debug!(
            evicted,
            total_bytes = self.total_bytes,
            target_bytes,
            "Trimmed cache"
        );
    }

    // == Metrics ==
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot::new(
            &self.stats,
            self.total_bytes,
            self.max_bytes,
            self.entries.len(),
            self.max_entries,
        )
    }

    /// Returns the raw counters.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    // == Introspection ==
    /// True if the key holds a live entry. Does not count as an access.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired(self.ttl))
    }

    /// Looks at an entry, expired or not, without touching recency or stats.
    pub fn peek_entry<Q>(&self, key: &Q) -> Option<&CacheEntry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    /// Keys from least to most recently used.
    pub fn keys_lru_order(&self) -> Vec<K> {
        self.lru.iter_oldest_first().cloned().collect()
    }

    /// Returns the current number of entries, including expired ones not
    /// yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn max_bytes(&self) -> Option<u64> {
        self.max_bytes
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    fn remove_entry<Q>(&mut self, key: &Q) -> Option<CacheEntry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entry = self.entries.remove(key)?;
        self.lru.remove(key);
        self.total_bytes -= entry.size_bytes;
        Some(entry)
    }

    /// Evicts the least recently used entry. Returns false when empty.
    fn evict_lru(&mut self) -> bool {
        let Some(key) = self.lru.evict_oldest() else {
            return false;
        };
        if let Some(entry) = self.entries.remove(&key) {
            self.total_bytes -= entry.size_bytes;
        }
        self.stats.record_eviction();
        true
    }

    /// Evicts until `total_bytes <= target_bytes` or nothing is left.
    fn evict_until(&mut self, target_bytes: u64) -> usize {
        let mut evicted = 0;
        while self.total_bytes > target_bytes && self.evict_lru() {
            evicted += 1;
        }
        evicted
    }

    fn log_stats_periodically(&self) {
        let accesses = self.stats.accesses();
        if accesses == 0 || accesses % STATS_LOG_EVERY != 0 {
            return;
        }
        debug!(
            hit_rate = self.stats.hit_rate(),
            hits = self.stats.hits,
            misses = self.stats.misses,
            total_bytes = self.total_bytes,
            max_bytes = ?self.max_bytes,
            entries = self.entries.len(),
            max_entries = self.max_entries,
            evictions = self.stats.evictions,
            "Cache stats"
        );
    }
}
