//! Error types for cache configuration
//!
//! Cache operations themselves are total; only building a configuration can
//! fail.

use thiserror::Error;

// == Config Error Enum ==
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A cache that can hold no entries would drop every put
    #[error("max_entries must be greater than zero")]
    ZeroCapacity,

    /// The periodic sweep would spin
    #[error("cleanup interval must be greater than zero")]
    ZeroCleanupInterval,

    /// An environment variable held something unparsable
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

// == Result Type Alias ==
pub type Result<T> = std::result::Result<T, ConfigError>;
