//! Access token revocation (blacklist) service
//!
//! Logout must take effect before the access token's natural expiry, so a
//! revoked token's jti is recorded until its `exp` passes. The capability
//! is a trait with two implementations: the in-process map below for
//! single-instance deployments, and the Redis-backed store in the
//! infrastructure layer, which is the only variant safe once more than one
//! process serves traffic.

mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::DomainResult;

pub use memory::InMemoryBlacklist;

/// Capability interface for access token revocation
#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    /// Records `jti` as revoked until `expires_at`
    ///
    /// A non-positive remaining lifetime is a no-op: the token is already
    /// unusable without our help.
    async fn blacklist(&self, jti: &str, expires_at: DateTime<Utc>) -> DomainResult<()>;

    /// Checks whether `jti` is currently revoked
    async fn is_blacklisted(&self, jti: &str) -> DomainResult<bool>;
}
