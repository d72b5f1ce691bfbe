//! Main token service implementation

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use jsonwebtoken::{decode, encode, Algorithm, Header, Validation};
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::warn;
use uuid::Uuid;

use crate::domain::entities::token::{Claims, RefreshToken, TokenPair};
use crate::domain::entities::user::UserIdentity;
use crate::errors::{DomainError, TokenError};
use crate::repositories::TokenRepository;
use crate::services::blacklist::TokenBlacklist;

use super::config::TokenServiceConfig;
use super::key_manager::{JsonWebKeySet, KeyManager};

/// Number of random bytes behind each opaque refresh token
const REFRESH_TOKEN_BYTES: usize = 64;

/// Service for issuing, validating, and rotating tokens
///
/// Validation is a pure cryptographic check; revocation is composed on top
/// via [`TokenBlacklist`] so the two concerns stay independently testable.
pub struct TokenService<R: TokenRepository> {
    repository: R,
    config: TokenServiceConfig,
    keys: Arc<KeyManager>,
    validation: Validation,
}

impl<R: TokenRepository> TokenService<R> {
    /// Creates a new token service
    pub fn new(repository: R, config: TokenServiceConfig, keys: Arc<KeyManager>) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = config.leeway_secs;

        Self {
            repository,
            config,
            keys,
            validation,
        }
    }

    /// Generates a new token pair for a user
    ///
    /// The access token carries the user's identity and role claims, signed
    /// RS256. The refresh token is opaque (64 CSPRNG bytes, base64) and is
    /// persisted hashed before the pair is returned.
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - The generated token pair
    /// * `Err(DomainError)` - Signing or persistence failed
    pub async fn generate_tokens(
        &self,
        user: &UserIdentity,
        roles: Vec<String>,
    ) -> Result<TokenPair, DomainError> {
        let access_token = self.issue_access_token(user, roles)?;
        let refresh_token = self.mint_refresh_token(user.id).await?;

        Ok(TokenPair::new(
            access_token,
            refresh_token,
            self.config.access_token_ttl_minutes,
            self.config.refresh_token_ttl_days,
        ))
    }

    /// Signs an access token for the given identity and roles
    fn issue_access_token(
        &self,
        user: &UserIdentity,
        roles: Vec<String>,
    ) -> Result<String, DomainError> {
        let claims = Claims::new_access_token(
            user,
            roles,
            &self.config.issuer,
            &self.config.audience,
            self.config.access_token_ttl_minutes,
        );
        self.encode_jwt(&claims)
    }

    /// Generates an opaque refresh token and persists its hash
    async fn mint_refresh_token(&self, user_id: Uuid) -> Result<String, DomainError> {
        let token_string = generate_opaque_token();
        let token_hash = hash_token(&token_string);

        let refresh_token = RefreshToken::new(
            user_id,
            token_hash,
            self.config.refresh_token_ttl_days,
        );
        self.repository
            .save_refresh_token(refresh_token)
            .await
            .map_err(|_| DomainError::Token(TokenError::TokenGenerationFailed))?;

        Ok(token_string)
    }

    /// Encodes claims into a signed JWT
    pub(crate) fn encode_jwt(&self, claims: &Claims) -> Result<String, DomainError> {
        let header = Header::new(Algorithm::RS256);
        encode(&header, claims, self.keys.encoding_key())
            .map_err(|_| DomainError::Token(TokenError::TokenGenerationFailed))
    }

    /// Verifies an access token and returns its claims
    ///
    /// Checks signature, issuer, audience, expiry, and not-before (with the
    /// configured leeway). This is a pure cryptographic operation: it never
    /// consults the blacklist and never surfaces raw parser errors.
    ///
    /// # Returns
    ///
    /// * `Ok(Claims)` - The decoded claims if valid
    /// * `Err(TokenError)` - Token is malformed, forged, expired, or not yet valid
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, TokenError> {
        let token_data = decode::<Claims>(token, self.keys.decoding_key(), &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::ImmatureSignature => TokenError::TokenNotYetValid,
                _ => TokenError::InvalidToken,
            })?;

        Ok(token_data.claims)
    }

    /// Resolves a raw refresh token to its owning user id
    ///
    /// Validity is not checked here; [`Self::refresh_tokens`] re-reads the
    /// token and enforces expiry and revocation.
    pub async fn refresh_token_owner(&self, refresh_token: &str) -> Result<Uuid, DomainError> {
        let token = self
            .repository
            .find_refresh_token(&hash_token(refresh_token))
            .await?
            .ok_or(DomainError::Token(TokenError::InvalidToken))?;
        Ok(token.user_id)
    }

    /// Rotates a refresh token into a new token pair
    ///
    /// Refresh tokens are single-use: the presented token is revoked and
    /// linked to its successor. Presenting an already-revoked token is
    /// treated as reuse of a stolen token and revokes every refresh token
    /// the user holds.
    ///
    /// # Arguments
    ///
    /// * `refresh_token` - The raw opaque refresh token
    /// * `user` - Current identity of the token's owner (looked up by the caller)
    /// * `roles` - Role names currently granted
    pub async fn refresh_tokens(
        &self,
        refresh_token: &str,
        user: &UserIdentity,
        roles: Vec<String>,
    ) -> Result<TokenPair, DomainError> {
        let token_hash = hash_token(refresh_token);

        let old_token = self
            .repository
            .find_refresh_token(&token_hash)
            .await?
            .ok_or(DomainError::Token(TokenError::InvalidToken))?;

        if old_token.user_id != user.id {
            return Err(DomainError::Token(TokenError::InvalidToken));
        }

        if old_token.is_expired() {
            return Err(DomainError::Token(TokenError::TokenExpired));
        }

        if old_token.is_revoked() {
            // Reuse of a rotated token: assume compromise and kill the session
            warn!(user_id = %old_token.user_id, "revoked refresh token presented, revoking all sessions");
            let _ = self.repository.revoke_all_user_tokens(old_token.user_id).await;
            return Err(DomainError::Token(TokenError::TokenRevoked));
        }

        let access_token = self.issue_access_token(user, roles)?;

        let new_token_string = generate_opaque_token();
        let new_entity = RefreshToken::new(
            user.id,
            hash_token(&new_token_string),
            self.config.refresh_token_ttl_days,
        );
        let saved = self.repository.save_refresh_token(new_entity).await?;

        self.repository
            .revoke_refresh_token(&token_hash, Some(saved.id))
            .await?;

        Ok(TokenPair::new(
            access_token,
            new_token_string,
            self.config.access_token_ttl_minutes,
            self.config.refresh_token_ttl_days,
        ))
    }

    /// Revokes a specific refresh token
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Token was revoked
    /// * `Ok(false)` - Token not found or already revoked
    pub async fn revoke_refresh_token(&self, token: &str) -> Result<bool, DomainError> {
        let token_hash = hash_token(token);
        self.repository.revoke_refresh_token(&token_hash, None).await
    }

    /// Revokes every refresh token a user holds
    ///
    /// Invoked on logout-everywhere and after password change/reset.
    pub async fn revoke_all_user_tokens(&self, user_id: Uuid) -> Result<usize, DomainError> {
        self.repository.revoke_all_user_tokens(user_id).await
    }

    /// Blacklists an access token by its jti until its natural expiry
    ///
    /// The token must carry a valid signature for this service (expiry is
    /// not re-checked; blacklisting an expired token is a harmless no-op in
    /// the store).
    pub async fn blacklist_access_token(
        &self,
        token: &str,
        blacklist: &dyn TokenBlacklist,
    ) -> Result<(), DomainError> {
        let mut validation = self.validation.clone();
        validation.validate_exp = false;

        let token_data = decode::<Claims>(token, self.keys.decoding_key(), &validation)
            .map_err(|_| DomainError::Token(TokenError::InvalidToken))?;

        blacklist
            .blacklist(&token_data.claims.jti, token_data.claims.expires_at())
            .await
    }

    /// Removes expired refresh tokens from storage
    pub async fn cleanup_expired_tokens(&self) -> Result<usize, DomainError> {
        self.repository.delete_expired_tokens().await
    }

    /// Exports the public signing key as a JWKS document
    pub fn jwks(&self) -> JsonWebKeySet {
        self.keys.jwks()
    }

    #[cfg(test)]
    pub(crate) fn repository(&self) -> &R {
        &self.repository
    }
}

/// Generates an opaque token from 64 bytes of CSPRNG output
pub fn generate_opaque_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

/// Hashes a token for storage lookup
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
