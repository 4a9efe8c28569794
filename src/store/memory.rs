use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ProfileStore, StoreError, StoredProfile};
use crate::models::profile::UserProfile;

/// In-process profile store with call counters and fault injection
#[derive(Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<String, StoredProfile>>,
    gets: AtomicUsize,
    replaces: AtomicUsize,
    unavailable: AtomicBool,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_profiles(profiles: impl IntoIterator<Item = UserProfile>) -> Self {
        let store = Self::new();
        for profile in profiles {
            store.insert(profile).await;
        }
        store
    }

    pub async fn insert(&self, profile: UserProfile) {
        self.profiles.write().await.insert(
            profile.username.clone(),
            StoredProfile {
                profile,
                version: 1,
            },
        );
    }

    /// Bump the stored version as if another writer got there first.
    pub async fn touch(&self, username: &str) {
        if let Some(stored) = self.profiles.write().await.get_mut(username) {
            stored.version += 1;
        }
    }

    pub async fn snapshot(&self, username: &str) -> Option<StoredProfile> {
        self.profiles.read().await.get(username).cloned()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn get_calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn replace_calls(&self) -> usize {
        self.replaces.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get(&self, username: &str) -> Result<Option<StoredProfile>, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.profiles.read().await.get(username).cloned())
    }

    async fn create(&self, profile: &UserProfile) -> Result<StoredProfile, StoreError> {
        self.check_available()?;
        let mut profiles = self.profiles.write().await;
        if profiles.contains_key(&profile.username) {
            return Err(StoreError::AlreadyExists(profile.username.clone()));
        }

        let stored = StoredProfile {
            profile: profile.clone(),
            version: 1,
        };
        profiles.insert(profile.username.clone(), stored.clone());
        Ok(stored)
    }

    async fn replace(
        &self,
        profile: &UserProfile,
        expected_version: i64,
    ) -> Result<StoredProfile, StoreError> {
        self.replaces.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        let mut profiles = self.profiles.write().await;
        let stored = profiles
            .get_mut(&profile.username)
            .ok_or_else(|| StoreError::NotFound(profile.username.clone()))?;

        if stored.version != expected_version {
            return Err(StoreError::VersionConflict {
                username: profile.username.clone(),
                expected: expected_version,
            });
        }

        stored.profile = profile.clone();
        stored.version += 1;
        Ok(stored.clone())
    }

    async fn delete(&self, username: &str) -> Result<(), StoreError> {
        self.check_available()?;
        self.profiles
            .write()
            .await
            .remove(username)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(username.to_string()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::existing_profile;

    #[tokio::test]
    async fn test_create_get_delete() {
        let store = InMemoryProfileStore::new();
        let profile = existing_profile("iceman");

        let created = store.create(&profile).await.unwrap();
        assert_eq!(created.version, 1);
        assert!(matches!(
            store.create(&profile).await,
            Err(StoreError::AlreadyExists(name)) if name == "iceman"
        ));

        let fetched = store.get("iceman").await.unwrap().unwrap();
        assert_eq!(fetched.profile, profile);

        store.delete("iceman").await.unwrap();
        assert!(store.get("iceman").await.unwrap().is_none());
        assert!(matches!(
            store.delete("iceman").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_replace_checks_version() {
        let store = InMemoryProfileStore::with_profiles([existing_profile("iceman")]).await;
        let mut profile = existing_profile("iceman");
        profile.bio = "You can be my wingman anytime.".to_string();

        let stored = store.replace(&profile, 1).await.unwrap();
        assert_eq!(stored.version, 2);

        assert!(matches!(
            store.replace(&profile, 1).await,
            Err(StoreError::VersionConflict { expected: 1, .. })
        ));
        assert_eq!(store.snapshot("iceman").await.unwrap().profile.bio, profile.bio);
    }

    #[tokio::test]
    async fn test_replace_missing_profile() {
        let store = InMemoryProfileStore::new();
        assert!(matches!(
            store.replace(&existing_profile("viper"), 1).await,
            Err(StoreError::NotFound(name)) if name == "viper"
        ));
    }
}
