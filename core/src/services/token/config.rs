//! Configuration for the token service

use arena_shared::config::auth::AuthConfig;

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Value of the `iss` claim
    pub issuer: String,
    /// Value of the `aud` claim
    pub audience: String,
    /// Access token expiry in minutes
    pub access_token_ttl_minutes: i64,
    /// Refresh token expiry in days
    pub refresh_token_ttl_days: i64,
    /// Clock-skew allowance for temporal claims, in seconds
    pub leeway_secs: u64,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            issuer: "arena-ops".to_string(),
            audience: "arena-ops-api".to_string(),
            access_token_ttl_minutes: 30,
            refresh_token_ttl_days: 7,
            leeway_secs: 60,
        }
    }
}

impl From<&AuthConfig> for TokenServiceConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_token_ttl_minutes: config.access_token_ttl_minutes,
            refresh_token_ttl_days: config.refresh_token_ttl_days,
            ..Default::default()
        }
    }
}
