//! Token authority configuration

use serde::{Deserialize, Serialize};

/// Configuration for JWT issuance and validation
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Value of the `iss` claim on issued tokens
    pub issuer: String,

    /// Value of the `aud` claim on issued tokens
    pub audience: String,

    /// Access token lifetime in minutes
    #[serde(default = "default_access_ttl_minutes")]
    pub access_token_ttl_minutes: i64,

    /// Refresh token lifetime in days
    #[serde(default = "default_refresh_ttl_days")]
    pub refresh_token_ttl_days: i64,

    /// Path to the PEM-encoded RSA private key. Generated on first startup
    /// if the file does not exist.
    pub private_key_path: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: "arena-ops".to_string(),
            audience: "arena-ops-api".to_string(),
            access_token_ttl_minutes: default_access_ttl_minutes(),
            refresh_token_ttl_days: default_refresh_ttl_days(),
            private_key_path: "keys/jwt_signing_key.pem".to_string(),
        }
    }
}

impl AuthConfig {
    /// Create from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or(defaults.audience),
            access_token_ttl_minutes: std::env::var("ACCESS_TOKEN_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.access_token_ttl_minutes),
            refresh_token_ttl_days: std::env::var("REFRESH_TOKEN_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.refresh_token_ttl_days),
            private_key_path: std::env::var("JWT_PRIVATE_KEY_PATH")
                .unwrap_or(defaults.private_key_path),
        }
    }
}

fn default_access_ttl_minutes() -> i64 {
    30
}

fn default_refresh_ttl_days() -> i64 {
    7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_config_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.issuer, "arena-ops");
        assert_eq!(config.audience, "arena-ops-api");
        assert_eq!(config.access_token_ttl_minutes, 30);
        assert_eq!(config.refresh_token_ttl_days, 7);
    }
}
