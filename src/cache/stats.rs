//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and evictions.

use serde::Serialize;

// == Cache Stats ==
/// Running cache counters. Reset only by an explicit clear.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries evicted by LRU pressure or trimming
    pub evictions: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.accesses();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Total lookups (hits + misses).
    pub fn accesses(&self) -> u64 {
        self.hits + self.misses
    }

    // == Record Hit ==
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Eviction ==
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Reset ==
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// == Metrics Snapshot ==
/// Read-only diagnostic view of a cache at one point in time.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub hits: u64,
    pub misses: u64,
    /// hits / (hits + misses); 0.0 before any access
    pub hit_rate: f64,
    /// Sum of the estimated sizes of live entries
    pub total_bytes: u64,
    /// Byte budget, `None` when the cache is only count-bounded
    pub max_bytes: Option<u64>,
    /// total_bytes / max_bytes; 0.0 when the byte bound is disabled
    pub bytes_utilization: f64,
    pub entry_count: usize,
    pub max_entries: usize,
    pub evictions: u64,
    /// RFC 3339 timestamp of when the snapshot was taken
    pub taken_at: String,
}

impl MetricsSnapshot {
    /// Builds a snapshot from the live counters and sizes.
    pub fn new(
        stats: &CacheStats,
        total_bytes: u64,
        max_bytes: Option<u64>,
        entry_count: usize,
        max_entries: usize,
    ) -> Self {
        let bytes_utilization = match max_bytes {
            Some(max) if max > 0 => total_bytes as f64 / max as f64,
            _ => 0.0,
        };

        Self {
            hits: stats.hits,
            misses: stats.misses,
            hit_rate: stats.hit_rate(),
            total_bytes,
            max_bytes,
            bytes_utilization,
            entry_count,
            max_entries,
            evictions: stats.evictions,
            taken_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
