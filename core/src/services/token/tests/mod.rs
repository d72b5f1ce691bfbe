//! Tests for the token service

mod key_manager_tests;

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entities::user::UserIdentity;
use crate::repositories::MockTokenRepository;

use super::key_manager::KeyManager;
use super::{TokenService, TokenServiceConfig};

/// 2048-bit RSA keygen is expensive; generate once and share across tests.
fn shared_keys() -> Arc<KeyManager> {
    use std::sync::OnceLock;
    static KEYS: OnceLock<Arc<KeyManager>> = OnceLock::new();
    KEYS.get_or_init(|| {
        let private_key = rsa::RsaPrivateKey::new(&mut rand::rngs::OsRng, 2048)
            .expect("key generation should succeed");
        let pem = rsa::pkcs8::EncodePrivateKey::to_pkcs8_pem(
            &private_key,
            rsa::pkcs8::LineEnding::LF,
        )
        .expect("PEM encoding should succeed");
        Arc::new(KeyManager::from_pem(&pem).expect("key manager should load PEM"))
    })
    .clone()
}

fn test_service() -> TokenService<MockTokenRepository> {
    test_service_with_config(TokenServiceConfig::default())
}

fn test_service_with_config(config: TokenServiceConfig) -> TokenService<MockTokenRepository> {
    TokenService::new(MockTokenRepository::new(), config, shared_keys())
}

fn test_user() -> UserIdentity {
    UserIdentity::new(Uuid::new_v4(), "manager@arena.example", "Venue Manager")
}
