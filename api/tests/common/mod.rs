//! Shared fixtures for API integration tests

use std::sync::{Arc, OnceLock};

use actix_web::web;

use arena_api::middleware::auth::TokenVerifier;
use arena_api::middleware::{JwtAuth, RateLimiter};
use arena_api::routes::auth::AppState;
use arena_core::domain::entities::user::UserIdentity;
use arena_core::repositories::MockTokenRepository;
use arena_core::services::blacklist::{InMemoryBlacklist, TokenBlacklist};
use arena_core::services::directory::{InMemoryDirectory, UserDirectory};
use arena_core::services::token::{KeyManager, TokenService, TokenServiceConfig};
use arena_infra::cache::{CacheConfig, RedisClient};
use arena_shared::config::rate_limit::RateLimitConfig;
use uuid::Uuid;

/// RSA keygen is slow; generate one pair for the whole test binary.
pub fn shared_keys() -> Arc<KeyManager> {
    static KEYS: OnceLock<Arc<KeyManager>> = OnceLock::new();
    KEYS.get_or_init(|| {
        let private_key = rsa::RsaPrivateKey::new(&mut rand::rngs::OsRng, 2048)
            .expect("key generation should succeed");
        let pem =
            rsa::pkcs8::EncodePrivateKey::to_pkcs8_pem(&private_key, rsa::pkcs8::LineEnding::LF)
                .expect("PEM encoding should succeed");
        Arc::new(KeyManager::from_pem(&pem).expect("key manager should load PEM"))
    })
    .clone()
}

/// Everything a test app needs, built over in-memory stores
pub struct TestHarness {
    pub token_service: Arc<TokenService<MockTokenRepository>>,
    pub blacklist: Arc<InMemoryBlacklist>,
    pub directory: Arc<InMemoryDirectory>,
    pub keys: Arc<KeyManager>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            token_service: Arc::new(TokenService::new(
                MockTokenRepository::new(),
                TokenServiceConfig::default(),
                shared_keys(),
            )),
            blacklist: Arc::new(InMemoryBlacklist::new()),
            directory: Arc::new(InMemoryDirectory::new()),
            keys: shared_keys(),
        }
    }

    pub fn state(&self) -> web::Data<AppState<MockTokenRepository>> {
        web::Data::new(AppState {
            token_service: self.token_service.clone(),
            blacklist: self.blacklist.clone() as Arc<dyn TokenBlacklist>,
            directory: self.directory.clone() as Arc<dyn UserDirectory>,
        })
    }

    pub fn keys_data(&self) -> web::Data<KeyManager> {
        web::Data::from(self.keys.clone())
    }

    pub fn verifier(&self) -> Arc<dyn TokenVerifier> {
        self.token_service.clone()
    }

    pub fn jwt_auth(&self) -> JwtAuth {
        JwtAuth::new(self.verifier(), self.blacklist.clone() as Arc<dyn TokenBlacklist>)
    }

    /// Limiter whose store is unreachable; every check fails open
    pub fn offline_rate_limiter(&self) -> RateLimiter {
        let config = CacheConfig {
            url: "redis://127.0.0.1:1".to_string(),
            max_connections: 2,
            operation_timeout_ms: 100,
        };
        let client = Arc::new(RedisClient::new(config).expect("client should build"));
        RateLimiter::new(client, RateLimitConfig::default(), self.verifier())
    }

    pub async fn register_user(&self, roles: Vec<String>) -> UserIdentity {
        let user = UserIdentity::new(Uuid::new_v4(), "fan@arena.example", "Season Ticket Holder");
        self.directory.insert(user.clone(), roles).await;
        user
    }
}
