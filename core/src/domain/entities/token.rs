//! Token entities for JWT-based authentication.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserIdentity;

/// Claims structure for the JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Email address of the subject
    pub email: String,

    /// Display name of the subject
    pub name: String,

    /// Role names granted to the subject
    pub roles: Vec<String>,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Not before timestamp
    pub nbf: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// JWT ID, unique per token; the blacklist key
    pub jti: String,
}

impl Claims {
    /// Creates new claims for an access token
    ///
    /// The jti is a freshly generated v4 UUID (CSPRNG-backed) and
    /// `exp - nbf` equals the configured TTL exactly.
    pub fn new_access_token(
        user: &UserIdentity,
        roles: Vec<String>,
        issuer: &str,
        audience: &str,
        ttl_minutes: i64,
    ) -> Self {
        let now = Utc::now();
        let expiry = now + Duration::minutes(ttl_minutes);

        Self {
            sub: user.id.to_string(),
            email: user.email.clone(),
            name: user.display_name.clone(),
            roles,
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            nbf: now.timestamp(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Checks if the claims have expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Gets the user ID from the claims
    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }

    /// Expiry as a `DateTime`, used when recording a blacklist entry
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

/// Refresh token entity persisted server-side
///
/// The raw opaque token never touches storage; only its SHA-256 hash does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    /// Unique identifier for the refresh token
    pub id: Uuid,

    /// User ID this token belongs to
    pub user_id: Uuid,

    /// Hashed token value
    pub token_hash: String,

    /// Timestamp when the token was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the token expires
    pub expires_at: DateTime<Utc>,

    /// When the token was revoked, if ever
    pub revoked_at: Option<DateTime<Utc>>,

    /// The token that replaced this one during rotation
    pub replaced_by: Option<Uuid>,
}

impl RefreshToken {
    /// Creates a new refresh token valid for `ttl_days`
    pub fn new(user_id: Uuid, token_hash: String, ttl_days: i64) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash,
            created_at: now,
            expires_at: now + Duration::days(ttl_days),
            revoked_at: None,
            replaced_by: None,
        }
    }

    /// Checks if the refresh token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Checks if the refresh token has been revoked
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// A token is valid if it has neither expired nor been revoked
    pub fn is_valid(&self) -> bool {
        !self.is_expired() && !self.is_revoked()
    }

    /// Revokes the token, optionally linking its rotation successor
    pub fn revoke(&mut self, replaced_by: Option<Uuid>) {
        self.revoked_at = Some(Utc::now());
        self.replaced_by = replaced_by;
    }
}

/// Token pair returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Signed JWT access token
    pub access_token: String,

    /// Opaque refresh token
    pub refresh_token: String,

    /// Access token lifetime in seconds
    pub access_expires_in: i64,

    /// Refresh token lifetime in seconds
    pub refresh_expires_in: i64,
}

impl TokenPair {
    /// Creates a new token pair
    pub fn new(
        access_token: String,
        refresh_token: String,
        access_ttl_minutes: i64,
        refresh_ttl_days: i64,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            access_expires_in: access_ttl_minutes * 60,
            refresh_expires_in: refresh_ttl_days * 24 * 60 * 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> UserIdentity {
        UserIdentity::new(Uuid::new_v4(), "fan@example.com", "Avid Fan")
    }

    #[test]
    fn test_access_token_claims() {
        let user = test_user();
        let claims = Claims::new_access_token(
            &user,
            vec!["Admin".to_string(), "StadiumManager".to_string()],
            "arena-ops",
            "arena-ops-api",
            30,
        );

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, "fan@example.com");
        assert_eq!(claims.name, "Avid Fan");
        assert_eq!(claims.roles.len(), 2);
        assert_eq!(claims.iss, "arena-ops");
        assert_eq!(claims.aud, "arena-ops-api");
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_claims_ttl_is_exact() {
        let claims = Claims::new_access_token(&test_user(), vec![], "iss", "aud", 30);
        assert_eq!(claims.exp - claims.nbf, 30 * 60);
        assert_eq!(claims.iat, claims.nbf);
    }

    #[test]
    fn test_claims_jti_unique_per_token() {
        let user = test_user();
        let a = Claims::new_access_token(&user, vec![], "iss", "aud", 30);
        let b = Claims::new_access_token(&user, vec![], "iss", "aud", 30);
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_claims_user_id_parsing() {
        let user = test_user();
        let claims = Claims::new_access_token(&user, vec![], "iss", "aud", 30);
        assert_eq!(claims.user_id().unwrap(), user.id);
    }

    #[test]
    fn test_claims_expiration() {
        let mut claims = Claims::new_access_token(&test_user(), vec![], "iss", "aud", 30);
        claims.exp = Utc::now().timestamp() - 1;
        assert!(claims.is_expired());
    }

    #[test]
    fn test_refresh_token_creation() {
        let user_id = Uuid::new_v4();
        let token = RefreshToken::new(user_id, "hash".to_string(), 7);

        assert_eq!(token.user_id, user_id);
        assert!(!token.is_revoked());
        assert!(!token.is_expired());
        assert!(token.is_valid());
        assert!(token.replaced_by.is_none());
    }

    #[test]
    fn test_refresh_token_revocation_links_successor() {
        let mut token = RefreshToken::new(Uuid::new_v4(), "hash".to_string(), 7);
        let successor = Uuid::new_v4();

        token.revoke(Some(successor));

        assert!(token.is_revoked());
        assert!(!token.is_valid());
        assert_eq!(token.replaced_by, Some(successor));
    }

    #[test]
    fn test_refresh_token_expiration() {
        let mut token = RefreshToken::new(Uuid::new_v4(), "hash".to_string(), 7);
        token.expires_at = Utc::now() - Duration::days(1);

        assert!(token.is_expired());
        assert!(!token.is_valid());
    }

    #[test]
    fn test_token_pair_expiry_seconds() {
        let pair = TokenPair::new("a".to_string(), "r".to_string(), 30, 7);
        assert_eq!(pair.access_expires_in, 1800);
        assert_eq!(pair.refresh_expires_in, 604_800);
    }

    #[test]
    fn test_claims_serialization_round_trip() {
        let claims = Claims::new_access_token(
            &test_user(),
            vec!["Viewer".to_string()],
            "arena-ops",
            "arena-ops-api",
            30,
        );

        let json = serde_json::to_string(&claims).unwrap();
        let deserialized: Claims = serde_json::from_str(&json).unwrap();
        assert_eq!(claims, deserialized);
    }
}
