//! User identity as seen by the token authority.
//!
//! Account storage and profile management belong to the core-domain
//! service; the token authority only needs enough identity to stamp
//! claims onto an access token.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimal identity of an authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Stable user identifier (`sub` claim)
    pub id: Uuid,

    /// Email address (`email` claim)
    pub email: String,

    /// Display name (`name` claim)
    pub display_name: String,
}

impl UserIdentity {
    /// Creates a new user identity
    pub fn new(id: Uuid, email: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            display_name: display_name.into(),
        }
    }
}
