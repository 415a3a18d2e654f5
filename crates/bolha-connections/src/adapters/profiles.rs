//! In-memory profile directory.

use crate::ports::ProfileDirectory;
use parking_lot::RwLock;
use shared_types::{UserId, UserProfile};
use std::collections::HashMap;

/// Profile directory held in memory, seeded at startup.
#[derive(Debug, Default)]
pub struct InMemoryProfileDirectory {
    profiles: RwLock<HashMap<UserId, UserProfile>>,
}

impl InMemoryProfileDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiles(profiles: impl IntoIterator<Item = UserProfile>) -> Self {
        let directory = Self::new();
        for profile in profiles {
            directory.upsert(profile);
        }
        directory
    }

    /// Insert or replace a profile.
    pub fn upsert(&self, profile: UserProfile) {
        self.profiles.write().insert(profile.id, profile);
    }

    /// Drop a profile. Relationship state referring to the account is left
    /// to the account deletion flow.
    pub fn remove(&self, user: UserId) -> Option<UserProfile> {
        self.profiles.write().remove(&user)
    }

    pub fn len(&self) -> usize {
        self.profiles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.read().is_empty()
    }
}

impl ProfileDirectory for InMemoryProfileDirectory {
    fn profile(&self, user: UserId) -> Option<UserProfile> {
        self.profiles.read().get(&user).cloned()
    }

    fn exists(&self, user: UserId) -> bool {
        self.profiles.read().contains_key(&user)
    }
}
