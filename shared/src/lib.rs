//! # Shared Layer
//!
//! Cross-cutting types for the ArenaOps backend: configuration structs
//! consumed by the other layers and the standard API response envelope.
//! This crate carries no business logic.

pub mod config;
pub mod types;

// Convenience re-exports for the most commonly used items
pub use config::auth::AuthConfig;
pub use config::cache::CacheConfig;
pub use config::database::DatabaseConfig;
pub use config::rate_limit::{RateLimitConfig, RateLimitRule};
pub use types::response::{ApiResponse, ErrorBody};
