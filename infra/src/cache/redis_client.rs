//! Redis cache client implementation
//!
//! Provides the async Redis client behind the rate-limit counters and the
//! token blacklist. Every operation is bounded by the configured timeout so
//! a degraded Redis degrades into fast failures instead of stalled requests;
//! the callers decide whether a failure is tolerable.

use std::future::Future;
use std::time::Duration;

use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, RedisResult, Script};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use arena_shared::config::cache::CacheConfig;

use crate::InfrastructureError;

/// Atomic fixed-window increment
///
/// INCR and EXPIRE must be one round trip: a client that increments and then
/// dies before setting the TTL would otherwise leave an immortal counter
/// that throttles its key forever.
const INCREMENT_WINDOW_SCRIPT: &str = r#"
local count = redis.call('INCR', KEYS[1])
if count == 1 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
end
local ttl = redis.call('TTL', KEYS[1])
return {count, ttl}
"#;

/// Counter state after a fixed-window increment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCount {
    /// Requests observed in the current window, this one included
    pub count: u64,
    /// Seconds until the window resets
    pub ttl_secs: i64,
}

/// Async Redis client with a lazily established shared connection
///
/// The connection is dialed on first use and cached; an I/O failure drops
/// the cache so the next operation redials. Construction never touches the
/// network, so a client can be built while Redis is down.
pub struct RedisClient {
    client: Client,
    connection: RwLock<Option<MultiplexedConnection>>,
    config: CacheConfig,
    window_script: Script,
}

impl RedisClient {
    /// Create a new Redis client
    ///
    /// Only the URL is validated here; connectivity problems surface on the
    /// first operation.
    pub fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        info!(url = %mask_url(&config.url), "creating Redis client");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        Ok(Self {
            client,
            connection: RwLock::new(None),
            config,
            window_script: Script::new(INCREMENT_WINDOW_SCRIPT),
        })
    }

    /// Returns the configured per-operation timeout
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.config.operation_timeout_ms)
    }

    /// Atomically increment a fixed-window counter
    ///
    /// The first increment of a window sets its expiry to `window_secs`;
    /// subsequent increments leave the expiry untouched so the window ends
    /// at a fixed instant regardless of traffic.
    pub async fn increment_window(
        &self,
        key: &str,
        window_secs: u64,
    ) -> Result<WindowCount, InfrastructureError> {
        let script = &self.window_script;
        let key = key.to_string();

        let (count, ttl_secs): (u64, i64) = self
            .run(move |mut conn| async move {
                script
                    .key(&key)
                    .arg(window_secs)
                    .invoke_async(&mut conn)
                    .await
            })
            .await?;

        Ok(WindowCount { count, ttl_secs })
    }

    /// Set a value with an expiration time
    pub async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry_seconds: u64,
    ) -> Result<(), InfrastructureError> {
        debug!(key, expiry_seconds, "setting key with expiry");
        let key = key.to_string();
        let value = value.to_string();

        self.run(move |mut conn| async move {
            conn.set_ex::<_, _, ()>(key, value, expiry_seconds).await
        })
        .await
    }

    /// Check whether a key exists
    pub async fn exists(&self, key: &str) -> Result<bool, InfrastructureError> {
        let key = key.to_string();
        self.run(move |mut conn| async move { conn.exists::<_, bool>(key).await })
            .await
    }

    /// Delete a key
    ///
    /// Returns true if the key was present.
    pub async fn delete(&self, key: &str) -> Result<bool, InfrastructureError> {
        let key = key.to_string();
        let deleted: u32 = self
            .run(move |mut conn| async move { conn.del::<_, u32>(key).await })
            .await?;
        Ok(deleted > 0)
    }

    /// Remaining time-to-live for a key
    ///
    /// Returns `None` when the key does not exist or carries no expiry.
    pub async fn ttl(&self, key: &str) -> Result<Option<i64>, InfrastructureError> {
        let key = key.to_string();
        let ttl: i64 = self
            .run(move |mut conn| async move { conn.ttl::<_, i64>(key).await })
            .await?;
        Ok(if ttl >= 0 { Some(ttl) } else { None })
    }

    /// Check connectivity with a PING
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        let response: String = self
            .run(|mut conn| async move {
                redis::cmd("PING").query_async::<_, String>(&mut conn).await
            })
            .await?;
        Ok(response == "PONG")
    }

    /// Run a single operation against the shared connection, bounded by the
    /// configured timeout
    async fn run<F, Fut, T>(&self, operation: F) -> Result<T, InfrastructureError>
    where
        F: FnOnce(MultiplexedConnection) -> Fut,
        Fut: Future<Output = RedisResult<T>>,
    {
        let timeout = self.operation_timeout();
        let conn = tokio::time::timeout(timeout, self.acquire_connection())
            .await
            .map_err(|_| {
                warn!("Redis connection attempt timed out");
                InfrastructureError::Timeout(self.config.operation_timeout_ms)
            })??;

        match tokio::time::timeout(timeout, operation(conn)).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                if e.is_connection_dropped() || e.is_io_error() {
                    self.discard_connection().await;
                }
                Err(InfrastructureError::Cache(e))
            }
            Err(_) => {
                self.discard_connection().await;
                Err(InfrastructureError::Timeout(self.config.operation_timeout_ms))
            }
        }
    }

    /// Return the cached connection, dialing if none is cached
    async fn acquire_connection(&self) -> Result<MultiplexedConnection, InfrastructureError> {
        if let Some(conn) = self.connection.read().await.as_ref() {
            return Ok(conn.clone());
        }

        let mut guard = self.connection.write().await;
        // Another task may have connected while we waited for the lock
        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }

        debug!("establishing Redis connection");
        let conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(InfrastructureError::Cache)?;
        *guard = Some(conn.clone());
        info!("connected to Redis");
        Ok(conn)
    }

    /// Drop the cached connection so the next operation redials
    async fn discard_connection(&self) {
        self.connection.write().await.take();
    }
}

/// Mask credentials in a Redis URL before it reaches the logs
pub(crate) fn mask_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(proto_end) = url.find("://") {
            let proto = &url[..proto_end + 3];
            let host_part = &url[at_pos..];
            return format!("{}****{}", proto, host_part);
        }
    }
    url.to_string()
}
