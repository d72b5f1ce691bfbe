//! MySQL implementation of the TokenRepository trait.
//!
//! Refresh tokens are stored by their SHA-256 hash; the raw opaque value
//! never reaches the database. Rotation chains are kept via the
//! `replaced_by` column so a replayed token can be traced to its successor.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use arena_core::domain::entities::token::RefreshToken;
use arena_core::errors::DomainError;
use arena_core::repositories::TokenRepository;

/// MySQL implementation of TokenRepository
pub struct MySqlTokenRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlTokenRepository {
    /// Create a new MySQL token repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert a database row to a RefreshToken entity
    fn row_to_token(row: &sqlx::mysql::MySqlRow) -> Result<RefreshToken, DomainError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| internal(format!("Failed to get id: {}", e)))?;
        let user_id: String = row
            .try_get("user_id")
            .map_err(|e| internal(format!("Failed to get user_id: {}", e)))?;
        let replaced_by: Option<String> = row
            .try_get("replaced_by")
            .map_err(|e| internal(format!("Failed to get replaced_by: {}", e)))?;

        Ok(RefreshToken {
            id: Uuid::parse_str(&id)
                .map_err(|e| internal(format!("Invalid token UUID: {}", e)))?,
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| internal(format!("Invalid user UUID: {}", e)))?,
            token_hash: row
                .try_get("token_hash")
                .map_err(|e| internal(format!("Failed to get token_hash: {}", e)))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| internal(format!("Failed to get created_at: {}", e)))?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| internal(format!("Failed to get expires_at: {}", e)))?,
            revoked_at: row
                .try_get::<Option<DateTime<Utc>>, _>("revoked_at")
                .map_err(|e| internal(format!("Failed to get revoked_at: {}", e)))?,
            replaced_by: replaced_by
                .map(|v| Uuid::parse_str(&v))
                .transpose()
                .map_err(|e| internal(format!("Invalid replaced_by UUID: {}", e)))?,
        })
    }
}

fn internal(message: String) -> DomainError {
    DomainError::Internal { message }
}

#[async_trait]
impl TokenRepository for MySqlTokenRepository {
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        let query = r#"
            INSERT INTO refresh_tokens (
                id, user_id, token_hash, created_at, expires_at, revoked_at, replaced_by
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#;

        let result = sqlx::query(query)
            .bind(token.id.to_string())
            .bind(token.user_id.to_string())
            .bind(&token.token_hash)
            .bind(token.created_at)
            .bind(token.expires_at)
            .bind(token.revoked_at)
            .bind(token.replaced_by.map(|id| id.to_string()))
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(token),
            // token_hash carries a unique index
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(DomainError::Validation {
                    message: "Token already exists".to_string(),
                })
            }
            Err(e) => Err(internal(format!("Failed to save refresh token: {}", e))),
        }
    }

    async fn find_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshToken>, DomainError> {
        let query = r#"
            SELECT id, user_id, token_hash, created_at, expires_at, revoked_at, replaced_by
            FROM refresh_tokens
            WHERE token_hash = ?
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| internal(format!("Failed to find refresh token: {}", e)))?;

        match result {
            Some(row) => Ok(Some(Self::row_to_token(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<RefreshToken>, DomainError> {
        let query = r#"
            SELECT id, user_id, token_hash, created_at, expires_at, revoked_at, replaced_by
            FROM refresh_tokens
            WHERE user_id = ?
                AND revoked_at IS NULL
                AND expires_at > ?
            ORDER BY created_at DESC
        "#;

        let rows = sqlx::query(query)
            .bind(user_id.to_string())
            .bind(Utc::now())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| internal(format!("Failed to find user tokens: {}", e)))?;

        let mut tokens = Vec::new();
        for row in rows {
            tokens.push(Self::row_to_token(&row)?);
        }

        Ok(tokens)
    }

    async fn revoke_refresh_token(
        &self,
        token_hash: &str,
        replaced_by: Option<Uuid>,
    ) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE refresh_tokens
            SET revoked_at = ?, replaced_by = ?
            WHERE token_hash = ? AND revoked_at IS NULL
        "#;

        let result = sqlx::query(query)
            .bind(Utc::now())
            .bind(replaced_by.map(|id| id.to_string()))
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| internal(format!("Failed to revoke token: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn revoke_all_user_tokens(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let query = r#"
            UPDATE refresh_tokens
            SET revoked_at = ?
            WHERE user_id = ? AND revoked_at IS NULL
        "#;

        let result = sqlx::query(query)
            .bind(Utc::now())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| internal(format!("Failed to revoke user tokens: {}", e)))?;

        Ok(result.rows_affected() as usize)
    }

    async fn delete_expired_tokens(&self) -> Result<usize, DomainError> {
        // Revoked tokens are kept 30 days for rotation-chain forensics
        let query = r#"
            DELETE FROM refresh_tokens
            WHERE expires_at < ?
                OR (revoked_at IS NOT NULL AND revoked_at < DATE_SUB(?, INTERVAL 30 DAY))
        "#;

        let now = Utc::now();
        let result = sqlx::query(query)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| internal(format!("Failed to delete expired tokens: {}", e)))?;

        Ok(result.rows_affected() as usize)
    }
}
