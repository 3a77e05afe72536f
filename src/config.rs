//! Configuration Module
//!
//! Construction-time cache configuration, with defaults and environment loading.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

// == Defaults ==
pub const DEFAULT_MAX_ENTRIES: usize = 200;
pub const DEFAULT_MAX_BYTES: u64 = 8 * 1024 * 1024;
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Cache configuration parameters.
///
/// Fixed once a cache is built. All values can be loaded from environment
/// variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// Byte budget over estimated sizes; `None` or `Some(0)` disables it
    pub max_bytes: Option<u64>,
    /// Per-entry lifetime; `None` disables expiry
    pub ttl: Option<Duration>,
    /// Interval for the optional background sweep task
    pub cleanup_interval: Duration,
}

impl CacheConfig {
    /// Count-bounded cache with no byte budget.
    pub fn count_bounded(max_entries: usize) -> Self {
        Self {
            max_entries,
            max_bytes: None,
            ..Self::default()
        }
    }

    /// Small cache for aggregate list payloads shared across screens:
    /// 20 entries, 2 MiB, 5 minute TTL.
    pub fn shared_payloads() -> Self {
        Self {
            max_entries: 20,
            max_bytes: Some(2 * 1024 * 1024),
            ..Self::default()
        }
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn with_max_bytes(mut self, max_bytes: Option<u64>) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Effective byte budget, treating `Some(0)` as disabled.
    pub fn byte_budget(&self) -> Option<u64> {
        self.max_bytes.filter(|&max| max > 0)
    }

    /// Checks the configuration for values no cache can work with.
    pub fn validate(&self) -> Result<()> {
        if self.max_entries == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.cleanup_interval.is_zero() {
            return Err(ConfigError::ZeroCleanupInterval);
        }
        Ok(())
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 200)
    /// - `CACHE_MAX_BYTES` - Byte budget, `0` disables it (default: 8 MiB)
    /// - `CACHE_TTL_SECS` - Entry lifetime in seconds, `0` disables expiry (default: 300)
    /// - `CACHE_CLEANUP_INTERVAL_SECS` - Sweep frequency in seconds (default: 60)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) against an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let max_entries =
            parse_var(&lookup, "CACHE_MAX_ENTRIES")?.unwrap_or(defaults.max_entries);
        let max_bytes = match parse_var::<u64, _>(&lookup, "CACHE_MAX_BYTES")? {
            Some(0) => None,
            Some(bytes) => Some(bytes),
            None => defaults.max_bytes,
        };
        let ttl = match parse_var::<u64, _>(&lookup, "CACHE_TTL_SECS")? {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => defaults.ttl,
        };
        let cleanup_interval = parse_var(&lookup, "CACHE_CLEANUP_INTERVAL_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.cleanup_interval);

        let config = Self {
            max_entries,
            max_bytes,
            ttl,
            cleanup_interval,
        };
        config.validate()?;
        Ok(config)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            max_bytes: Some(DEFAULT_MAX_BYTES),
            ttl: Some(DEFAULT_TTL),
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value: raw }),
    }
}
