//! Cache module for Redis-backed shared state
//!
//! Redis carries the two pieces of state that must be visible to every
//! instance: fixed-window rate-limit counters and the access token
//! blacklist.

pub mod blacklist_store;
pub mod redis_client;

#[cfg(test)]
mod tests;

pub use blacklist_store::RedisBlacklist;
pub use redis_client::{RedisClient, WindowCount};

// Re-export commonly used types
pub use arena_shared::config::cache::CacheConfig;
