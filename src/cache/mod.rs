//! Cache Module
//!
//! Provides in-memory caching bounded by entry count and estimated bytes,
//! with TTL expiration and LRU eviction.

mod entry;
mod lru;
mod shared;
mod size;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use shared::{BoundedCache, Cache};
pub use size::{
    default_estimator, Bitmap, Blob, EstimateSize, SizeEstimator, ELEMENT_SIZE_ESTIMATE,
    OPAQUE_SIZE_ESTIMATE,
};
pub use stats::{CacheStats, MetricsSnapshot};
pub use store::{CacheStore, PutOutcome};
