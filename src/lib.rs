//! Bounded Cache - A memory-aware in-memory cache
//!
//! Bounds entries by count and by estimated bytes, expires them after a TTL,
//! and evicts in least-recently-used order. Safe to share across threads.

pub mod cache;
pub mod config;
pub mod error;
pub mod payload;
pub mod tasks;

pub use cache::{BoundedCache, Cache, EstimateSize, MetricsSnapshot, PutOutcome};
pub use config::CacheConfig;
pub use error::ConfigError;
pub use payload::Payload;
pub use tasks::spawn_cleanup_task;
