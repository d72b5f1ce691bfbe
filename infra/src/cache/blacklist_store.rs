//! Redis-backed token blacklist
//!
//! Stores revoked access token jtis with a TTL equal to the token's
//! remaining lifetime; Redis expiry handles eviction, so the store never
//! accumulates entries for tokens that have already expired.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use arena_core::errors::DomainResult;
use arena_core::services::blacklist::TokenBlacklist;

use super::redis_client::RedisClient;

/// Key prefix for blacklist entries
const BLACKLIST_PREFIX: &str = "token_blacklist";

/// Shared-store blacklist, the correct choice for multi-instance deployments
pub struct RedisBlacklist {
    client: Arc<RedisClient>,
}

impl RedisBlacklist {
    /// Create a blacklist backed by the given Redis client
    pub fn new(client: Arc<RedisClient>) -> Self {
        Self { client }
    }

    fn key(jti: &str) -> String {
        format!("{}:{}", BLACKLIST_PREFIX, jti)
    }
}

#[async_trait]
impl TokenBlacklist for RedisBlacklist {
    async fn blacklist(&self, jti: &str, expires_at: DateTime<Utc>) -> DomainResult<()> {
        let remaining = (expires_at - Utc::now()).num_seconds();
        if remaining <= 0 {
            debug!(jti, "token already expired, skipping blacklist entry");
            return Ok(());
        }

        self.client
            .set_with_expiry(&Self::key(jti), "revoked", remaining as u64)
            .await?;
        debug!(jti, remaining_secs = remaining, "access token blacklisted");
        Ok(())
    }

    async fn is_blacklisted(&self, jti: &str) -> DomainResult<bool> {
        Ok(self.client.exists(&Self::key(jti)).await?)
    }
}
