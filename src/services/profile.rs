use std::{future::Future, sync::Arc, time::Duration};

use chrono::Utc;

use crate::{
    models::profile::{Attachment, ProfileSubmission, UserProfile},
    store::{ProfileStore, StoreError, StoredProfile},
    uploads::{AttachmentStore, UploadError},
    validation::{Violation, validate_profile},
};

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error(transparent)]
    Invalid(#[from] Violation),
    #[error("session user {session} may not update profile {target}")]
    Forbidden { session: String, target: String },
    #[error("profile {0} not found")]
    ProfileNotFound(String),
    #[error("profile {0} was modified by a concurrent update")]
    ConflictingUpdate(String),
    #[error("store failure: {0}")]
    Store(#[from] StoreError),
    #[error("attachment upload failure: {0}")]
    AttachmentUpload(#[from] UploadError),
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
}

/// Validates, merges and persists profile updates
pub struct ProfileService {
    store: Arc<dyn ProfileStore>,
    attachments: Arc<dyn AttachmentStore>,
    io_timeout: Duration,
}

impl ProfileService {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        attachments: Arc<dyn AttachmentStore>,
        io_timeout: Duration,
    ) -> Self {
        Self {
            store,
            attachments,
            io_timeout,
        }
    }

    /// Apply a profile submission on behalf of `session_user`.
    ///
    /// Validation and the identity check happen before any store I/O. The
    /// stored document is then read, every mutable field is overwritten,
    /// the optional picture is uploaded (its URL wins over the submitted
    /// one) and the document is written back with a version-checked
    /// full replace.
    #[tracing::instrument(skip_all, fields(username = %session_user))]
    pub async fn update_profile(
        &self,
        session_user: &str,
        submission: &ProfileSubmission,
        attachment: Option<Attachment>,
    ) -> Result<UserProfile, ProfileError> {
        let update = validate_profile(submission, Utc::now()).inspect_err(|violation| {
            tracing::info!("Profile update rejected: {:?}", violation);
        })?;

        if update.username != session_user {
            tracing::warn!(
                "Session user tried to update profile {}",
                update.username
            );
            return Err(ProfileError::Forbidden {
                session: session_user.to_string(),
                target: update.username,
            });
        }

        let StoredProfile {
            profile: mut document,
            version,
        } = self
            .bounded("profile lookup", self.store.get(session_user))
            .await?
            .ok_or_else(|| {
                tracing::info!("Profile update target does not exist");
                ProfileError::ProfileNotFound(session_user.to_string())
            })?;

        document.apply(update);

        if let Some(attachment) = attachment {
            let url = self
                .bounded(
                    "attachment upload",
                    self.attachments.upload(session_user, &attachment),
                )
                .await?;
            document.profile_picture_url = url;
        }

        let stored = self
            .bounded("profile replace", self.store.replace(&document, version))
            .await
            .map_err(|e| match e {
                ProfileError::Store(StoreError::VersionConflict { username, .. }) => {
                    ProfileError::ConflictingUpdate(username)
                }
                ProfileError::Store(StoreError::NotFound(username)) => {
                    ProfileError::ProfileNotFound(username)
                }
                other => other,
            })?;

        tracing::info!("Profile update committed at version {}", stored.version);
        Ok(stored.profile)
    }

    pub async fn get_profile(&self, username: &str) -> Result<UserProfile, ProfileError> {
        self.bounded("profile lookup", self.store.get(username))
            .await?
            .map(|stored| stored.profile)
            .ok_or_else(|| ProfileError::ProfileNotFound(username.to_string()))
    }

    pub async fn health(&self) -> Result<(), ProfileError> {
        self.bounded("store ping", self.store.ping()).await
    }

    async fn bounded<T, E>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, E>>,
    ) -> Result<T, ProfileError>
    where
        E: Into<ProfileError>,
    {
        match tokio::time::timeout(self.io_timeout, call).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => Err(ProfileError::Timeout {
                operation,
                after: self.io_timeout,
            }),
        }
    }
}
