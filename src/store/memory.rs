//! In-memory profile store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::DatabaseError;
use crate::onboarding::model::Profile;
use crate::store::traits::ProfileStore;

/// Keeps profiles in a map for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    profiles: RwLock<HashMap<String, Profile>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.profiles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.profiles.read().await.is_empty()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn save_profile(&self, session_id: &str, profile: &Profile) -> Result<(), DatabaseError> {
        self.profiles
            .write()
            .await
            .insert(session_id.to_string(), profile.clone());
        Ok(())
    }

    async fn load_profile(&self, session_id: &str) -> Result<Option<Profile>, DatabaseError> {
        Ok(self.profiles.read().await.get(session_id).cloned())
    }

    async fn delete_profile(&self, session_id: &str) -> Result<bool, DatabaseError> {
        Ok(self.profiles.write().await.remove(session_id).is_some())
    }
}
