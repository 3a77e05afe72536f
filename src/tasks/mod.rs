//! Background Tasks Module
//!
//! Optional periodic jobs a composition root can run alongside a cache.
//!
//! # Tasks
//! - TTL Cleanup: Removes expired cache entries at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
