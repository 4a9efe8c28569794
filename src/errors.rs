use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    services::profile::ProfileError, store::StoreError, uploads::UploadError,
    validation::Violation,
};

/// Application-wide error type
#[derive(Debug)]
pub enum AppError {
    // Store errors
    StoreError(StoreError),

    // Attachment errors
    UploadError(UploadError),

    // Authentication errors
    InvalidToken,
    TokenExpired,
    Unauthorized,
    Forbidden,

    // Request errors
    ValidationError(Violation),
    MalformedRequest(String),
    PayloadTooLarge,

    // Profile errors
    ProfileNotFound,
    ConflictingUpdate,

    // Internal errors
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::StoreError(e) => {
                tracing::error!("Store error: {:?}", e);
                internal_error()
            }
            AppError::UploadError(e) => {
                tracing::error!("Attachment upload error: {:?}", e);
                internal_error()
            }
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token.".to_string()),
            AppError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired.".to_string()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized.".to_string()),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "You may only update your own profile.".to_string(),
            ),
            AppError::ValidationError(violation) => {
                (StatusCode::BAD_REQUEST, violation.to_string())
            }
            AppError::MalformedRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body is too large.".to_string(),
            ),
            AppError::ProfileNotFound => (StatusCode::NOT_FOUND, "User not found.".to_string()),
            AppError::ConflictingUpdate => (
                StatusCode::CONFLICT,
                "Profile was modified by another request. Please retry.".to_string(),
            ),
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                internal_error()
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

fn internal_error() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error.".to_string(),
    )
}

impl From<ProfileError> for AppError {
    fn from(e: ProfileError) -> Self {
        match e {
            ProfileError::Invalid(violation) => AppError::ValidationError(violation),
            ProfileError::Forbidden { .. } => AppError::Forbidden,
            ProfileError::ProfileNotFound(_) => AppError::ProfileNotFound,
            ProfileError::ConflictingUpdate(_) => AppError::ConflictingUpdate,
            ProfileError::Store(e) => AppError::StoreError(e),
            ProfileError::AttachmentUpload(e) => AppError::UploadError(e),
            e @ ProfileError::Timeout { .. } => AppError::InternalError(e.to_string()),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::MalformedRequest(e.body_text())
        }
    }
}

impl From<MultipartRejection> for AppError {
    fn from(e: MultipartRejection) -> Self {
        AppError::MalformedRequest(e.body_text())
    }
}
