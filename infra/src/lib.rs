//! # Infrastructure Layer
//!
//! Concrete backends for the ArenaOps token authority: Redis for
//! rate-limit counters and the token blacklist, MySQL for refresh token
//! persistence.
//!
//! The domain layer only sees the traits it defines; everything in this
//! crate is an implementation detail behind them.

/// Cache module - Redis client, counters, and blacklist store
pub mod cache;

/// Database module - MySQL implementations using SQLx
pub mod database;

// Re-export core error types for convenience
pub use arena_core::errors::{DomainError, DomainResult, TokenError};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Operation exceeded its deadline
    #[error("Cache operation timed out after {0}ms")]
    Timeout(u64),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl InfrastructureError {
    /// Whether the error indicates an unreachable or degraded backing store
    ///
    /// Callers that fail open key off this distinction: a down store is
    /// tolerated, a misconfigured one is not.
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Cache(e) => matches!(
                e.kind(),
                redis::ErrorKind::IoError
                    | redis::ErrorKind::ClientError
                    | redis::ErrorKind::BusyLoadingError
                    | redis::ErrorKind::TryAgain
            ),
            Self::Timeout(_) => true,
            _ => false,
        }
    }
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        DomainError::Internal {
            message: err.to_string(),
        }
    }
}
