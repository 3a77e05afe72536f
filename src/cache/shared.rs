//! Shared Cache Module
//!
//! Thread-safe wrapper around [`CacheStore`]. Every operation takes one
//! exclusive lock for its duration; a `get` hit reorders recency, so reads
//! mutate too and a read/write lock would buy nothing.

use std::borrow::Borrow;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::cache::{
    CacheStore, EstimateSize, MetricsSnapshot, PutOutcome, SizeEstimator,
};
use crate::config::CacheConfig;
use crate::error::Result;

// == Cache Trait ==
/// The narrow interface collaborators program against.
pub trait Cache<K, V> {
    fn get(&self, key: &K) -> Option<V>;
    fn put(&self, key: K, value: V) -> PutOutcome;
    fn remove(&self, key: &K);
    fn clear(&self);
}

// == Bounded Cache ==
/// A bounded, memory-aware, TTL-expiring LRU cache safe for concurrent use.
///
/// Share it through an `Arc`:
///
/// ```
/// use std::sync::Arc;
/// use bounded_cache::{BoundedCache, CacheConfig};
///
/// let cache: Arc<BoundedCache<String, Vec<String>>> =
///     Arc::new(BoundedCache::new(CacheConfig::shared_payloads()));
///
/// cache.put("offers".to_string(), vec!["2x1 coffee".to_string()]);
/// assert_eq!(cache.get("offers").map(|offers| offers.len()), Some(1));
/// ```
pub struct BoundedCache<K, V> {
    store: Mutex<CacheStore<K, V>>,
    config: CacheConfig,
}

impl<K, V> std::fmt::Debug for BoundedCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedCache")
            .field("config", &self.config)
            .field("store", &*self.store.lock())
            .finish()
    }
}

impl<K, V> BoundedCache<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructors ==
    /// Creates a cache whose values are sized by their [`EstimateSize`] impl.
    pub fn new(config: CacheConfig) -> Self
    where
        V: EstimateSize,
    {
        let store = CacheStore::new(&config);
        Self::from_parts(store, config)
    }

    /// Like [`new`](Self::new), but refuses configurations that fail
    /// [`CacheConfig::validate`].
    pub fn try_new(config: CacheConfig) -> Result<Self>
    where
        V: EstimateSize,
    {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Creates a cache with a caller-supplied size policy, for value types
    /// whose true cost the caller knows better than the defaults.
    pub fn with_estimator<F>(config: CacheConfig, estimator: F) -> Self
    where
        F: Fn(&V) -> u64 + Send + Sync + 'static,
    {
        let estimator: SizeEstimator<V> = Arc::new(estimator);
        let store = CacheStore::with_estimator(&config, estimator);
        Self::from_parts(store, config)
    }

    fn from_parts(store: CacheStore<K, V>, config: CacheConfig) -> Self {
        debug!(
            max_entries = config.max_entries,
            max_bytes = ?config.byte_budget(),
            ttl = ?config.ttl,
            "Bounded cache created"
        );
        Self {
            store: Mutex::new(store),
            config,
        }
    }

    // == Core Operations ==
    /// Returns a clone of the live value for `key`, refreshing its recency.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.store.lock().get(key)
    }

    /// Stores `value` under `key`; see [`CacheStore::put`].
    pub fn put(&self, key: K, value: V) -> PutOutcome {
        self.store.lock().put(key, value)
    }

    /// Removes `key`, returning its value if it was still live.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.lock().remove(key)
    }

    pub fn clear(&self) {
        self.store.lock().clear()
    }

    // == Maintenance ==
    /// Purges every expired entry. Returns the number removed.
    pub fn cleanup_expired(&self) -> usize {
        self.store.lock().cleanup_expired()
    }

    /// Evicts least recently used entries down to `target_bytes`. Meant for
    /// memory-pressure hooks.
    pub fn trim_to(&self, target_bytes: u64) {
        self.store.lock().trim_to(target_bytes)
    }

    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.store.lock().metrics_snapshot()
    }

    // == Cache-Aside ==
    /// Returns the cached value, or runs `fetch` on a miss and caches its
    /// successful result.
    ///
    /// The lock is not held while `fetch` runs. Errors are returned as-is and
    /// nothing is cached.
    pub fn get_or_fetch<F, E>(&self, key: K, fetch: F) -> std::result::Result<V, E>
    where
        F: FnOnce() -> std::result::Result<V, E>,
        V: Clone,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = fetch()?;
        self.put(key, value.clone());
        Ok(value)
    }

    /// Async flavour of [`get_or_fetch`](Self::get_or_fetch). The lock is
    /// never held across the await.
    pub async fn get_or_fetch_async<F, Fut, E>(
        &self,
        key: K,
        fetch: F,
    ) -> std::result::Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
        V: Clone,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = fetch().await?;
        self.put(key, value.clone());
        Ok(value)
    }

    // == Introspection ==
    /// True if `key` holds a live entry. Not counted as an access.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.lock().contains_key(key)
    }

    /// Keys from least to most recently used.
    pub fn keys_lru_order(&self) -> Vec<K> {
        self.store.lock().keys_lru_order()
    }

    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.store.lock().total_bytes()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}

impl<K, V> Cache<K, V> for BoundedCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn get(&self, key: &K) -> Option<V> {
        BoundedCache::get(self, key)
    }

    fn put(&self, key: K, value: V) -> PutOutcome {
        BoundedCache::put(self, key, value)
    }

    fn remove(&self, key: &K) {
        BoundedCache::remove(self, key);
    }

    fn clear(&self) {
        BoundedCache::clear(self)
    }
}
