//! In-process blacklist for single-instance deployments

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::errors::DomainResult;

use super::TokenBlacklist;

/// Default interval between sweep passes
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// In-memory jti blacklist with periodic eviction of expired entries
///
/// Revocation state lives in this process only; use the shared-store
/// implementation whenever more than one instance can receive traffic.
pub struct InMemoryBlacklist {
    entries: RwLock<HashMap<String, DateTime<Utc>>>,
    sweep_interval: Duration,
}

impl InMemoryBlacklist {
    /// Creates a blacklist with the default 5-minute sweep interval
    pub fn new() -> Self {
        Self::with_sweep_interval(DEFAULT_SWEEP_INTERVAL)
    }

    /// Creates a blacklist with a custom sweep interval
    pub fn with_sweep_interval(sweep_interval: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            sweep_interval,
        }
    }

    /// Spawns the background sweep task
    pub fn start_sweeper(self: &Arc<Self>) {
        let blacklist = Arc::clone(self);
        let interval = blacklist.sweep_interval;

        tokio::spawn(async move {
            info!(interval_secs = interval.as_secs(), "blacklist sweeper started");
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it so a fresh map is
            // not swept at startup.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let evicted = blacklist.sweep().await;
                if evicted > 0 {
                    debug!(evicted, "evicted expired blacklist entries");
                }
            }
        });
    }

    /// Evicts entries whose expiry has strictly passed
    ///
    /// Entries at or before `now` are dead weight; anything still in its
    /// revocation window is left untouched, so a sweep can never race a
    /// membership check into a false negative.
    pub async fn sweep(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, expires_at| *expires_at > now);
        before - entries.len()
    }

    /// Number of live entries (expired-but-unswept entries included)
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the map holds no entries at all
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for InMemoryBlacklist {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenBlacklist for InMemoryBlacklist {
    async fn blacklist(&self, jti: &str, expires_at: DateTime<Utc>) -> DomainResult<()> {
        if expires_at <= Utc::now() {
            return Ok(());
        }

        let mut entries = self.entries.write().await;
        entries.insert(jti.to_string(), expires_at);
        Ok(())
    }

    async fn is_blacklisted(&self, jti: &str) -> DomainResult<bool> {
        let entries = self.entries.read().await;
        // An unswept entry past its expiry no longer revokes anything
        Ok(entries
            .get(jti)
            .map(|expires_at| *expires_at > Utc::now())
            .unwrap_or(false))
    }
}
