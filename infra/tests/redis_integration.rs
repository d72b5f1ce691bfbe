//! Integration tests for the Redis cache client
//!
//! These tests require a running Redis instance.
//! Run with: cargo test -p arena_infra --test redis_integration -- --ignored

use std::sync::Arc;

use arena_core::services::blacklist::TokenBlacklist;
use arena_infra::cache::{CacheConfig, RedisBlacklist, RedisClient};
use chrono::{Duration, Utc};
use uuid::Uuid;

fn live_config() -> CacheConfig {
    CacheConfig {
        url: std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
        ..CacheConfig::default()
    }
}

fn unique_key(prefix: &str) -> String {
    format!("test:{}:{}", prefix, Uuid::new_v4())
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_health_check() {
    let client = RedisClient::new(live_config()).unwrap();
    assert!(client.health_check().await.unwrap());
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_window_counter_increments_and_expires() {
    let client = RedisClient::new(live_config()).unwrap();
    let key = unique_key("window");

    let first = client.increment_window(&key, 2).await.unwrap();
    assert_eq!(first.count, 1);
    assert!(first.ttl_secs > 0 && first.ttl_secs <= 2);

    let second = client.increment_window(&key, 2).await.unwrap();
    assert_eq!(second.count, 2);
    // The window deadline is fixed at the first increment
    assert!(second.ttl_secs <= first.ttl_secs);

    tokio::time::sleep(std::time::Duration::from_secs(3)).await;

    // A fresh window starts counting from one again
    let after = client.increment_window(&key, 2).await.unwrap();
    assert_eq!(after.count, 1);

    client.delete(&key).await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_set_exists_delete_round_trip() {
    let client = RedisClient::new(live_config()).unwrap();
    let key = unique_key("kv");

    client.set_with_expiry(&key, "value", 60).await.unwrap();
    assert!(client.exists(&key).await.unwrap());
    assert!(client.ttl(&key).await.unwrap().unwrap() > 0);

    assert!(client.delete(&key).await.unwrap());
    assert!(!client.exists(&key).await.unwrap());
    assert!(!client.delete(&key).await.unwrap());
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_blacklist_entry_lives_until_token_expiry() {
    let client = Arc::new(RedisClient::new(live_config()).unwrap());
    let blacklist = RedisBlacklist::new(client.clone());
    let jti = Uuid::new_v4().to_string();

    blacklist
        .blacklist(&jti, Utc::now() + Duration::seconds(2))
        .await
        .unwrap();
    assert!(blacklist.is_blacklisted(&jti).await.unwrap());

    tokio::time::sleep(std::time::Duration::from_secs(3)).await;

    // Redis expiry evicted the entry along with the token's lifetime
    assert!(!blacklist.is_blacklisted(&jti).await.unwrap());
}
