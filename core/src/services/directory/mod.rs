//! User directory capability
//!
//! The token authority does not own account storage; it only needs to turn
//! a user id back into the identity and role set that get stamped onto a
//! fresh access token during refresh. The platform's account service plugs
//! in behind this trait.

mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::user::UserIdentity;
use crate::errors::DomainResult;

pub use memory::InMemoryDirectory;

/// Identity and granted roles as the directory currently knows them
///
/// Resolved at refresh time so rotated tokens pick up role changes instead
/// of carrying stale grants for another seven days.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub identity: UserIdentity,
    pub roles: Vec<String>,
}

/// Lookup interface into the platform's account store
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve a user id to its current profile
    ///
    /// `Ok(None)` means the account no longer exists; callers treat that
    /// the same as an invalid credential.
    async fn find_profile(&self, user_id: Uuid) -> DomainResult<Option<UserProfile>>;
}
