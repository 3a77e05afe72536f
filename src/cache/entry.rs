//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Monotonic insertion time, used for TTL
    pub inserted_at: Instant,
    /// Insertion order assigned by the owning store
    pub sequence: u64,
    /// Estimated footprint, computed once at insertion
    pub size_bytes: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry stamped with the current instant.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `sequence` - Sequence number assigned by the store
    /// * `size_bytes` - Estimated size of `value`
    pub fn new(value: V, sequence: u64, size_bytes: u64) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
            sequence,
            size_bytes,
        }
    }

    // == Age ==
    /// Time elapsed since insertion.
    pub fn age(&self) -> Duration {
        self.inserted_at.elapsed()
    }

    // == Is Expired ==
    /// Checks if the entry has outlived `ttl`.
    ///
    /// An entry expires once its age is strictly greater than the TTL.
    /// A `None` TTL never expires.
    pub fn is_expired(&self, ttl: Option<Duration>) -> bool {
        self.is_expired_at(Instant::now(), ttl)
    }

    /// Same as [`is_expired`](Self::is_expired) against a caller-supplied
    /// instant, so a sweep can judge every entry against one clock reading.
    pub fn is_expired_at(&self, now: Instant, ttl: Option<Duration>) -> bool {
        match ttl {
            Some(ttl) => now.saturating_duration_since(self.inserted_at) > ttl,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, or None if no TTL applies.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` if the entry has expired
    /// - `Some(remaining)` if the entry is still live
    /// - `None` if `ttl` is `None`
    pub fn ttl_remaining(&self, ttl: Option<Duration>) -> Option<Duration> {
        ttl.map(|ttl| ttl.saturating_sub(self.age()))
    }
}
