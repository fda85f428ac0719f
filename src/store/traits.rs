//! `ProfileStore` trait — where finished profiles go once onboarding ends.

use async_trait::async_trait;

use crate::error::DatabaseError;
use crate::onboarding::model::Profile;

/// Backend-agnostic persistence for completed financial profiles, keyed by
/// session (single-user deployments use one fixed id).
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Insert or replace the profile for a session.
    async fn save_profile(&self, session_id: &str, profile: &Profile) -> Result<(), DatabaseError>;

    /// Load a previously saved profile.
    async fn load_profile(&self, session_id: &str) -> Result<Option<Profile>, DatabaseError>;

    /// Remove a saved profile. Returns whether one existed.
    async fn delete_profile(&self, session_id: &str) -> Result<bool, DatabaseError>;
}
