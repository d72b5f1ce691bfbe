//! Mock implementation of TokenRepository for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::token::RefreshToken;
use crate::errors::DomainError;

use super::r#trait::TokenRepository;

/// In-memory token repository for tests and local development
pub struct MockTokenRepository {
    tokens: Arc<RwLock<HashMap<String, RefreshToken>>>,
}

impl MockTokenRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            tokens: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MockTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenRepository for MockTokenRepository {
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        let mut tokens = self.tokens.write().await;

        if tokens.contains_key(&token.token_hash) {
            return Err(DomainError::Validation {
                message: "Token already exists".to_string(),
            });
        }

        tokens.insert(token.token_hash.clone(), token.clone());
        Ok(token)
    }

    async fn find_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.get(token_hash).cloned())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens
            .values()
            .filter(|t| t.user_id == user_id && t.is_valid())
            .cloned()
            .collect())
    }

    async fn revoke_refresh_token(
        &self,
        token_hash: &str,
        replaced_by: Option<Uuid>,
    ) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.write().await;

        match tokens.get_mut(token_hash) {
            Some(token) if !token.is_revoked() => {
                token.revoke(replaced_by);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_all_user_tokens(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let mut revoked = 0;

        for token in tokens.values_mut() {
            if token.user_id == user_id && !token.is_revoked() {
                token.revoke(None);
                revoked += 1;
            }
        }

        Ok(revoked)
    }

    async fn delete_expired_tokens(&self) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, token| !token.is_expired());
        Ok(before - tokens.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_save_and_find() {
        let repo = MockTokenRepository::new();
        let token = RefreshToken::new(Uuid::new_v4(), "hash-1".to_string(), 7);

        repo.save_refresh_token(token.clone()).await.unwrap();

        let found = repo.find_refresh_token("hash-1").await.unwrap().unwrap();
        assert_eq!(found.id, token.id);
    }

    #[tokio::test]
    async fn test_duplicate_hash_rejected() {
        let repo = MockTokenRepository::new();
        let user_id = Uuid::new_v4();

        repo.save_refresh_token(RefreshToken::new(user_id, "dup".to_string(), 7))
            .await
            .unwrap();
        let result = repo
            .save_refresh_token(RefreshToken::new(user_id, "dup".to_string(), 7))
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_revoke_records_successor() {
        let repo = MockTokenRepository::new();
        let token = RefreshToken::new(Uuid::new_v4(), "hash-2".to_string(), 7);
        repo.save_refresh_token(token).await.unwrap();

        let successor = Uuid::new_v4();
        assert!(repo
            .revoke_refresh_token("hash-2", Some(successor))
            .await
            .unwrap());

        let found = repo.find_refresh_token("hash-2").await.unwrap().unwrap();
        assert!(found.is_revoked());
        assert_eq!(found.replaced_by, Some(successor));

        // Second revocation is a no-op
        assert!(!repo.revoke_refresh_token("hash-2", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_revoke_all_user_tokens() {
        let repo = MockTokenRepository::new();
        let user_id = Uuid::new_v4();

        for i in 0..3 {
            repo.save_refresh_token(RefreshToken::new(user_id, format!("hash-{i}"), 7))
                .await
                .unwrap();
        }
        repo.save_refresh_token(RefreshToken::new(Uuid::new_v4(), "other".to_string(), 7))
            .await
            .unwrap();

        assert_eq!(repo.revoke_all_user_tokens(user_id).await.unwrap(), 3);
        assert!(repo.find_by_user_id(user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_expired_tokens() {
        let repo = MockTokenRepository::new();
        let mut expired = RefreshToken::new(Uuid::new_v4(), "old".to_string(), 7);
        expired.expires_at = Utc::now() - Duration::days(1);

        repo.save_refresh_token(expired).await.unwrap();
        repo.save_refresh_token(RefreshToken::new(Uuid::new_v4(), "live".to_string(), 7))
            .await
            .unwrap();

        assert_eq!(repo.delete_expired_tokens().await.unwrap(), 1);
        assert!(repo.find_refresh_token("old").await.unwrap().is_none());
        assert!(repo.find_refresh_token("live").await.unwrap().is_some());
    }
}
