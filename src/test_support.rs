//! Fixtures and fakes shared by the unit tests.

use std::{
    future::pending,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use serde_json::Map;

use crate::{
    models::profile::{Attachment, MembershipStatus, ProfileSubmission, UserProfile},
    store::{ProfileStore, StoreError, StoredProfile, memory::InMemoryProfileStore},
    uploads::{AttachmentStore, UploadError},
};

/// A submission for `maverick` that passes every rule.
pub fn valid_submission() -> ProfileSubmission {
    ProfileSubmission {
        username: Some("maverick".into()),
        email: Some("maverick@topgun.example".into()),
        first_name: Some("Pete".into()),
        last_name: Some("Mitchell".into()),
        date_of_birth: Some("1962-08-01".into()),
        address: Some("NAS North Island, San Diego".into()),
        phone_number: Some("+14155551234".into()),
        profile_picture_url: Some("https://cdn.example.com/maverick.png".into()),
        bio: Some("I feel the need for speed.".into()),
        flight_experience_level: Some("expert".into()),
        preferred_aircraft: Some("F/A-18E Super Hornet".into()),
        favorite_destinations: Some("Miramar, Fallon".into()),
        membership_status: Some("premium".into()),
        date_of_account_creation: Some("2020-01-01T00:00:00Z".into()),
        last_login_date: Some("2025-03-13T08:00:00Z".into()),
    }
}

/// A stored document whose values all differ from [`valid_submission`].
pub fn existing_profile(username: &str) -> UserProfile {
    UserProfile {
        username: username.to_string(),
        email: format!("{username}@old.example"),
        first_name: "Old".into(),
        last_name: "Name".into(),
        date_of_birth: "1970-01-01".into(),
        address: "Hangar 1".into(),
        phone_number: "15550000000".into(),
        profile_picture_url: "https://cdn.example.com/old.png".into(),
        bio: "Student pilot.".into(),
        flight_experience_level: "beginner".into(),
        preferred_aircraft: "Cessna 172".into(),
        favorite_destinations: "KPAO".into(),
        membership_status: MembershipStatus::Free,
        date_of_account_creation: "2019-06-01T00:00:00Z".into(),
        last_login_date: "2019-06-02T00:00:00Z".into(),
        extra: Map::new(),
    }
}

/// Uploader that records every call and answers with a fixed URL
pub struct RecordingUploader {
    url: Option<String>,
    uploads: Mutex<Vec<(String, Attachment)>>,
    bump: Option<Arc<InMemoryProfileStore>>,
}

impl RecordingUploader {
    pub fn new(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            uploads: Mutex::new(Vec::new()),
            bump: None,
        }
    }

    pub fn failing() -> Self {
        Self {
            url: None,
            uploads: Mutex::new(Vec::new()),
            bump: None,
        }
    }

    /// Bumps the stored document's version while "uploading", simulating a
    /// concurrent writer between read and replace.
    pub fn bumping(url: &str, store: Arc<InMemoryProfileStore>) -> Self {
        Self {
            bump: Some(store),
            ..Self::new(url)
        }
    }

    pub fn uploads(&self) -> Vec<(String, Attachment)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl AttachmentStore for RecordingUploader {
    async fn upload(&self, username: &str, attachment: &Attachment) -> Result<String, UploadError> {
        self.uploads
            .lock()
            .unwrap()
            .push((username.to_string(), attachment.clone()));
        if let Some(store) = &self.bump {
            store.touch(username).await;
        }
        self.url
            .clone()
            .ok_or(UploadError::Location(url::ParseError::EmptyHost))
    }
}

/// Store whose calls never complete
pub struct StalledStore;

#[async_trait]
impl ProfileStore for StalledStore {
    async fn get(&self, _username: &str) -> Result<Option<StoredProfile>, StoreError> {
        pending().await
    }

    async fn create(&self, _profile: &UserProfile) -> Result<StoredProfile, StoreError> {
        pending().await
    }

    async fn replace(
        &self,
        _profile: &UserProfile,
        _expected_version: i64,
    ) -> Result<StoredProfile, StoreError> {
        pending().await
    }

    async fn delete(&self, _username: &str) -> Result<(), StoreError> {
        pending().await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        pending().await
    }
}
