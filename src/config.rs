//! Runtime settings.
//!
//! The service reads them from the shuttle secret store through
//! [`Settings::from_lookup`].

use std::time::Duration;

use validator::Validate;

pub const DEFAULT_IO_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_PICTURE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("setting {key} must be a whole number, got {value:?}")]
    NotANumber { key: &'static str, value: String },
    #[error("invalid settings: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

#[derive(Debug, Clone, Validate)]
pub struct Settings {
    /// HS256 secret used to verify session tokens
    #[validate(length(min = 32))]
    pub jwt_secret: String,

    /// Prefix profile pictures are PUT under
    #[validate(url)]
    pub picture_upload_url: String,

    /// Prefix of the URLs handed back to clients
    #[validate(url)]
    pub picture_public_url: String,

    pub picture_upload_token: Option<String>,

    #[validate(range(min = 1, max = 120))]
    pub io_timeout_secs: u64,

    #[validate(range(min = 1024, max = 52428800))]
    pub max_picture_bytes: usize,
}

impl Settings {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let picture_upload_url = required("PICTURE_UPLOAD_URL")?;
        let settings = Self {
            jwt_secret: required("JWT_SECRET")?,
            picture_public_url: lookup("PICTURE_PUBLIC_URL")
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| picture_upload_url.clone()),
            picture_upload_url,
            picture_upload_token: lookup("PICTURE_UPLOAD_TOKEN").filter(|value| !value.is_empty()),
            io_timeout_secs: number(&lookup, "IO_TIMEOUT_SECS", DEFAULT_IO_TIMEOUT_SECS)?,
            max_picture_bytes: number(&lookup, "MAX_PICTURE_BYTES", DEFAULT_MAX_PICTURE_BYTES)?,
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_secs(self.io_timeout_secs)
    }
}

fn number<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::NotANumber { key, value }),
    }
}
