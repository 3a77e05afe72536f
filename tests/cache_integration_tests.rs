//! Integration Tests for the public cache API
//!
//! Exercises the cache the way a repository layer would: cache-aside reads,
//! mixed payload sizes, a background sweeper and memory-pressure trims.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, sleep};
use std::time::Duration;

use anyhow::{anyhow, Result};
use bounded_cache::{
    cache::{Bitmap, Blob},
    spawn_cleanup_task, BoundedCache, Cache, CacheConfig, EstimateSize, Payload, PutOutcome,
};

// == Helper Functions ==

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bounded_cache=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// Cache whose values are their own size estimate.
fn sized_cache(max_entries: usize, max_bytes: u64) -> BoundedCache<&'static str, u64> {
    let config = CacheConfig::default()
        .with_max_entries(max_entries)
        .with_max_bytes(Some(max_bytes));
    BoundedCache::with_estimator(config, |size: &u64| *size)
}

#[derive(Debug, Clone, PartialEq)]
struct Offer {
    id: u32,
    title: String,
}

impl EstimateSize for Offer {}

// == Bounds ==

#[test]
fn test_lru_get_refreshes_recency() {
    init_tracing();
    let cache = sized_cache(2, 10_000);

    cache.put("A", 1);
    cache.put("B", 1);
    cache.get("A");
    cache.put("C", 1);

    assert!(cache.contains_key("A"));
    assert!(!cache.contains_key("B"));
    assert!(cache.contains_key("C"));
}

#[test]
fn test_concrete_eviction_scenario() {
    init_tracing();
    let cache = sized_cache(3, 1000);

    for key in ["A", "B", "C"] {
        cache.put(key, 300);
    }
    assert_eq!(cache.total_bytes(), 900);

    cache.put("D", 300);
    assert_eq!(cache.keys_lru_order(), ["B", "C", "D"]);
    assert_eq!(cache.total_bytes(), 900);

    assert_eq!(cache.get("B"), Some(300));
    assert_eq!(cache.keys_lru_order(), ["C", "D", "B"]);

    cache.put("E", 300);
    assert_eq!(cache.keys_lru_order(), ["D", "B", "E"]);
    assert_eq!(cache.metrics_snapshot().evictions, 2);
}

#[test]
fn test_oversized_put_is_rejected() {
    init_tracing();
    let cache = sized_cache(10, 500);

    let outcome = cache.put("X", 600);

    assert_eq!(
        outcome,
        PutOutcome::Rejected {
            size_bytes: 600,
            max_bytes: 500
        }
    );
    assert_eq!(cache.get("X"), None);
    assert_eq!(cache.metrics_snapshot().entry_count, 0);
    assert_eq!(cache.total_bytes(), 0);
}

#[test]
fn test_default_estimates_drive_the_byte_budget() {
    init_tracing();
    // 3 bitmaps of 10x10 = 432 bytes each
    let config = CacheConfig::default()
        .with_max_entries(10)
        .with_max_bytes(Some(1000));
    let cache: BoundedCache<&'static str, Payload> = BoundedCache::new(config);

    cache.put("a", Payload::from(Bitmap::blank(10, 10)));
    cache.put("b", Payload::from(Bitmap::blank(10, 10)));
    assert_eq!(cache.total_bytes(), 864);

    cache.put("c", Payload::from(Bitmap::blank(10, 10)));
    assert_eq!(cache.keys_lru_order(), ["b", "c"]);

    cache.put("blob", Payload::from(Blob(vec![0u8; 84])));
    assert_eq!(cache.total_bytes(), 964);

    assert!(!cache.put("big", Payload::from(Blob(vec![0u8; 2000]))).is_stored());
}

// == Expiry ==

#[test]
fn test_ttl_expired_entry_is_a_miss() {
    init_tracing();
    let config = CacheConfig::default().with_ttl(Some(Duration::from_millis(100)));
    let cache: BoundedCache<String, String> = BoundedCache::new(config);

    cache.put("A".to_string(), "v".to_string());
    let misses_before = cache.metrics_snapshot().misses;
    let len_before = cache.len();

    sleep(Duration::from_millis(150));

    assert_eq!(cache.get("A"), None);
    assert_eq!(cache.metrics_snapshot().misses, misses_before + 1);
    assert_eq!(cache.len(), len_before - 1);
}

#[test]
fn test_manual_sweep_and_trim() {
    init_tracing();
    let config = CacheConfig::default().with_ttl(Some(Duration::from_millis(100)));
    let cache: BoundedCache<String, String> = BoundedCache::new(config);

    cache.put("old".to_string(), "x".repeat(10));
    sleep(Duration::from_millis(150));
    cache.put("fresh1".to_string(), "x".repeat(10));
    cache.put("fresh2".to_string(), "x".repeat(10));

    assert_eq!(cache.cleanup_expired(), 1);
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.total_bytes(), 88);

    // App went to background
    cache.trim_to(50);
    assert_eq!(cache.keys_lru_order(), ["fresh2".to_string()]);
    assert_eq!(cache.total_bytes(), 44);
}

#[tokio::test]
async fn test_background_sweeper() {
    init_tracing();
    let config = CacheConfig::default()
        .with_ttl(Some(Duration::from_millis(100)))
        .with_cleanup_interval(Duration::from_millis(50));
    let cache: Arc<BoundedCache<String, String>> = Arc::new(BoundedCache::new(config.clone()));

    cache.put("a".to_string(), "1".to_string());
    cache.put("b".to_string(), "2".to_string());

    let handle = spawn_cleanup_task(cache.clone(), config.cleanup_interval);
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert!(cache.is_empty());
    assert_eq!(cache.total_bytes(), 0);

    handle.abort();
}

// == Clear ==

#[test]
fn test_clear_is_idempotent() {
    init_tracing();
    let cache = sized_cache(2, 1000);
    cache.put("A", 100);
    cache.put("B", 100);
    cache.put("C", 100);
    cache.get("A");
    cache.get("C");

    cache.clear();
    cache.clear();

    let snapshot = cache.metrics_snapshot();
    assert_eq!(cache.len(), 0);
    assert_eq!(snapshot.total_bytes, 0);
    assert_eq!((snapshot.hits, snapshot.misses, snapshot.evictions), (0, 0, 0));
}

// == Cache-Aside ==

/// Repository-style collaborator holding only the narrow interface.
struct OfferRepository<C> {
    cache: Arc<C>,
    fetches: AtomicUsize,
    online: bool,
}

impl<C: Cache<String, Vec<Offer>>> OfferRepository<C> {
    const CACHE_KEY: &'static str = "offers";

    fn offers(&self) -> Result<Vec<Offer>> {
        let key = Self::CACHE_KEY.to_string();
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }
        let offers = self.fetch()?;
        self.cache.put(key, offers.clone());
        Ok(offers)
    }

    fn fetch(&self) -> Result<Vec<Offer>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if !self.online {
            return Err(anyhow!("network unavailable"));
        }
        Ok(vec![
            Offer {
                id: 1,
                title: "2x1 coffee".to_string(),
            },
            Offer {
                id: 2,
                title: "10% off".to_string(),
            },
        ])
    }
}

#[test]
fn test_repository_serves_cached_data_after_first_fetch() -> Result<()> {
    init_tracing();
    let cache: Arc<BoundedCache<String, Vec<Offer>>> =
        Arc::new(BoundedCache::new(CacheConfig::shared_payloads()));
    let repository = OfferRepository {
        cache: cache.clone(),
        fetches: AtomicUsize::new(0),
        online: true,
    };

    let first = repository.offers()?;
    let second = repository.offers()?;

    assert_eq!(first, second);
    assert_eq!(first[0].id, 1);
    assert_eq!(first[1].title, "10% off");
    assert_eq!(repository.fetches.load(Ordering::SeqCst), 1);
    // 2 offers: 2 * 8 + 32 + 2 * 64
    assert_eq!(cache.total_bytes(), 176);
    Ok(())
}

#[test]
fn test_repository_propagates_fetch_errors() {
    init_tracing();
    let cache: Arc<BoundedCache<String, Vec<Offer>>> =
        Arc::new(BoundedCache::new(CacheConfig::shared_payloads()));
    let repository = OfferRepository {
        cache: cache.clone(),
        fetches: AtomicUsize::new(0),
        online: false,
    };

    let err = repository.offers().unwrap_err();

    assert!(err.to_string().contains("network unavailable"));
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_get_or_fetch_async_cache_aside() -> Result<()> {
    init_tracing();
    let cache: BoundedCache<u32, Vec<Offer>> = BoundedCache::new(CacheConfig::default());

    let offers = cache
        .get_or_fetch_async(7, || async {
            Ok::<_, anyhow::Error>(vec![Offer {
                id: 7,
                title: "free refill".to_string(),
            }])
        })
        .await?;
    let cached = cache
        .get_or_fetch_async(7, || async { Err(anyhow!("should hit the cache")) })
        .await?;

    assert_eq!(offers, cached);
    assert_eq!(cache.metrics_snapshot().hits, 1);
    Ok(())
}

// == Concurrency ==

#[test]
fn test_concurrent_readers_and_writers() {
    init_tracing();
    let cache = Arc::new(sized_cache(32, 5_000));
    let keys: Vec<&'static str> = (0..64)
        .map(|i| &*Box::leak(format!("key-{i}").into_boxed_str()))
        .collect();
    let keys = Arc::new(keys);

    let workers: Vec<_> = (0..8)
        .map(|worker| {
            let cache = Arc::clone(&cache);
            let keys = Arc::clone(&keys);
            thread::spawn(move || {
                for i in 0..1_000usize {
                    let key = keys[(worker * 13 + i) % keys.len()];
                    match i % 5 {
                        0 => {
                            cache.remove(key);
                        }
                        1 | 2 => {
                            cache.get(key);
                        }
                        _ => {
                            cache.put(key, 100 + (i as u64 % 7) * 50);
                        }
                    }
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().expect("worker panicked");
    }

    let snapshot = cache.metrics_snapshot();
    assert!(snapshot.entry_count <= 32);
    assert!(snapshot.total_bytes <= 5_000);
    assert_eq!(snapshot.hits + snapshot.misses, 8 * 400);
    assert_eq!(cache.keys_lru_order().len(), snapshot.entry_count);
}

// == Serialization ==

#[test]
fn test_metrics_snapshot_serializes() {
    init_tracing();
    let cache = sized_cache(4, 1000);
    cache.put("A", 500);
    cache.get("A");

    let json = serde_json::to_value(cache.metrics_snapshot()).expect("serializable");

    assert_eq!(json["hits"], 1);
    assert_eq!(json["total_bytes"], 500);
    assert_eq!(json["bytes_utilization"], 0.5);
    assert_eq!(json["entry_count"], 1);
    assert!(json["taken_at"].is_string());
}

#[test]
fn test_config_round_trips_through_serde() {
    let config = CacheConfig::shared_payloads();
    let json = serde_json::to_string(&config).expect("serializable");
    let parsed: CacheConfig = serde_json::from_str(&json).expect("deserializable");
    assert_eq!(parsed, config);
}
