use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use url::Url;
use uuid::Uuid;

use crate::{config::Settings, models::profile::Attachment};

const PICTURE_PREFIX: &str = "profile-pictures";

/// Namespace for content-derived picture ids
const PICTURE_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a4e_93d7_4b0a_8e55_c1d2_7f40_b9a3);

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("upload request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid object location: {0}")]
    Location(#[from] url::ParseError),
}

/// Durable storage for uploaded profile pictures
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Store the attachment and return the URL it can be fetched from.
    async fn upload(&self, username: &str, attachment: &Attachment) -> Result<String, UploadError>;
}

/// Object store reachable over plain HTTP PUT
pub struct HttpObjectStore {
    client: reqwest::Client,
    upload_base: Url,
    public_base: Url,
    token: Option<String>,
}

impl HttpObjectStore {
    pub fn new(settings: &Settings) -> Result<Self, UploadError> {
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(settings.io_timeout())
                .build()?,
            upload_base: directory_url(&settings.picture_upload_url)?,
            public_base: directory_url(&settings.picture_public_url)?,
            token: settings.picture_upload_token.clone(),
        })
    }
}

#[async_trait]
impl AttachmentStore for HttpObjectStore {
    async fn upload(&self, username: &str, attachment: &Attachment) -> Result<String, UploadError> {
        let key = object_key(
            username,
            &attachment.content_type,
            content_id(&attachment.bytes),
        );
        let target = self.upload_base.join(&key)?;

        let mut request = self
            .client
            .put(target)
            .header(CONTENT_TYPE, attachment.content_type.as_str())
            .body(attachment.bytes.clone());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        request.send().await?.error_for_status()?;

        let public = self.public_base.join(&key)?;
        tracing::debug!(
            "Stored profile picture {:?} for {} at {}",
            attachment.file_name,
            username,
            public
        );
        Ok(public.to_string())
    }
}

/// Same bytes, same id: re-sending a picture overwrites the object it
/// already created instead of minting a new URL.
pub fn content_id(bytes: &[u8]) -> Uuid {
    Uuid::new_v5(&PICTURE_NAMESPACE, bytes)
}

/// `profile-pictures/<username>/<id>.<ext>`, with the username reduced to
/// characters that are safe in a single path segment.
pub fn object_key(username: &str, content_type: &str, id: Uuid) -> String {
    let owner: String = username
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect();

    format!("{PICTURE_PREFIX}/{owner}/{id}.{}", extension_for(content_type))
}

fn extension_for(content_type: &str) -> &'static str {
    let essence = content_type.split(';').next().unwrap_or("").trim();
    match essence.to_ascii_lowercase().as_str() {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "bin",
    }
}

// Url::join replaces the last path segment unless the base ends with '/'.
fn directory_url(raw: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
