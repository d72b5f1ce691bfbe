//! Server configuration assembled from the environment

use arena_shared::config::auth::AuthConfig;
use arena_shared::config::cache::CacheConfig;
use arena_shared::config::database::DatabaseConfig;
use arena_shared::config::rate_limit::RateLimitConfig;

/// Full configuration for the API server
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Token issuance settings
    pub auth: AuthConfig,
    /// Redis settings (rate limiting and blacklist)
    pub cache: CacheConfig,
    /// MySQL settings (refresh token store)
    pub database: DatabaseConfig,
    /// Rate limiter settings
    pub rate_limit: RateLimitConfig,
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to
    /// development defaults
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            auth: AuthConfig::from_env(),
            cache: CacheConfig::from_env(),
            database: DatabaseConfig::from_env(),
            rate_limit: RateLimitConfig::from_env(),
        }
    }

    /// The address to bind, `host:port`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
