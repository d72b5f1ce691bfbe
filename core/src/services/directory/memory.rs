//! In-memory user directory for tests and local development

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::user::UserIdentity;
use crate::errors::DomainResult;

use super::{UserDirectory, UserProfile};

/// HashMap-backed directory
pub struct InMemoryDirectory {
    profiles: RwLock<HashMap<Uuid, UserProfile>>,
}

impl InMemoryDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
        }
    }

    /// Register a user with the given roles
    pub async fn insert(&self, identity: UserIdentity, roles: Vec<String>) {
        let mut profiles = self.profiles.write().await;
        profiles.insert(identity.id, UserProfile { identity, roles });
    }
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_profile(&self, user_id: Uuid) -> DomainResult<Option<UserProfile>> {
        let profiles = self.profiles.read().await;
        Ok(profiles.get(&user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_find_registered_profile() {
        let directory = InMemoryDirectory::new();
        let user = UserIdentity::new(Uuid::new_v4(), "ops@arena.example", "Ops");
        directory
            .insert(user.clone(), vec!["StadiumManager".to_string()])
            .await;

        let profile = directory.find_profile(user.id).await.unwrap().unwrap();
        assert_eq!(profile.identity, user);
        assert_eq!(profile.roles, vec!["StadiumManager".to_string()]);

        assert!(directory
            .find_profile(Uuid::new_v4())
            .await
            .unwrap()
            .is_none());
    }
}
