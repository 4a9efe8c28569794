//! Persistence boundary for profile documents.
//!
//! Documents live in a collection keyed (and partitioned) by username. Every
//! stored document carries a version counter; `replace` only succeeds when
//! the caller still holds the latest version.

pub mod postgres;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;

use crate::models::profile::UserProfile;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored document for {username} is malformed: {source}")]
    Decode {
        username: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("profile {0} already exists")]
    AlreadyExists(String),
    #[error("profile {0} does not exist")]
    NotFound(String),
    #[error("profile {username} changed after version {expected} was read")]
    VersionConflict { username: String, expected: i64 },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A profile document together with its store version
#[derive(Debug, Clone, PartialEq)]
pub struct StoredProfile {
    pub profile: UserProfile,
    pub version: i64,
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, username: &str) -> Result<Option<StoredProfile>, StoreError>;

    /// Fails with `AlreadyExists` if the username is taken.
    async fn create(&self, profile: &UserProfile) -> Result<StoredProfile, StoreError>;

    /// Full-document replace keyed by `profile.username`.
    async fn replace(
        &self,
        profile: &UserProfile,
        expected_version: i64,
    ) -> Result<StoredProfile, StoreError>;

    async fn delete(&self, username: &str) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
