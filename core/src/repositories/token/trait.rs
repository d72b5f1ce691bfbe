//! Token repository trait defining the interface for refresh token persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::token::RefreshToken;
use crate::errors::DomainError;

/// Repository trait for RefreshToken entity persistence operations
///
/// Refresh tokens are stored hashed; the raw opaque value exists only in
/// transit. Rotation marks the old token revoked and records its successor
/// so reuse of a rotated token is detectable.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Save a new refresh token to the repository
    ///
    /// # Returns
    /// * `Ok(RefreshToken)` - The saved token
    /// * `Err(DomainError)` - Save failed (e.g. duplicate hash)
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError>;

    /// Find a refresh token by its hashed value
    async fn find_refresh_token(&self, token_hash: &str)
        -> Result<Option<RefreshToken>, DomainError>;

    /// Find all valid refresh tokens for a user
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<RefreshToken>, DomainError>;

    /// Revoke a specific refresh token, optionally recording the token
    /// that replaced it in a rotation chain
    ///
    /// # Returns
    /// * `Ok(true)` - Token was revoked
    /// * `Ok(false)` - Token not found or already revoked
    async fn revoke_refresh_token(
        &self,
        token_hash: &str,
        replaced_by: Option<Uuid>,
    ) -> Result<bool, DomainError>;

    /// Revoke all refresh tokens for a user
    ///
    /// Used at logout-everywhere and after password change/reset.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of tokens revoked
    async fn revoke_all_user_tokens(&self, user_id: Uuid) -> Result<usize, DomainError>;

    /// Delete expired refresh tokens from the repository
    ///
    /// Called periodically to keep the store small.
    async fn delete_expired_tokens(&self) -> Result<usize, DomainError>;
}
