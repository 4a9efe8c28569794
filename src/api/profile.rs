use axum::{
    Extension, Json,
    extract::{Multipart, State, multipart::MultipartRejection},
};

use crate::{
    errors::AppError,
    middleware::auth::SessionUser,
    models::{
        app_state::AppState,
        profile::{
            Attachment, ErrorResponse, ProfileResponse, ProfileSubmission, UpdateProfileResponse,
        },
    },
};

/// Multipart field carrying the optional profile picture
pub const PICTURE_FIELD: &str = "profilePicture";

/// Get current user's profile
#[utoipa::path(
    get,
    path = "/user/profile",
    responses(
        (status = 200, description = "User profile", body = ProfileResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Profile",
    security(("bearer" = []))
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(SessionUser(username)): Extension<SessionUser>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = state.profiles.get_profile(&username).await?;

    Ok(Json(ProfileResponse { profile }))
}

/// Update current user's profile
///
/// Every text field is required. An optional `profilePicture` file part
/// replaces `profilePictureUrl` with the URL of the uploaded picture.
#[utoipa::path(
    post,
    path = "/user/update",
    request_body(content = ProfileSubmission, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Profile updated successfully", body = UpdateProfileResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Username does not match session", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Concurrent update", body = ErrorResponse),
        (status = 413, description = "Request body too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Profile",
    security(("bearer" = []))
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(SessionUser(username)): Extension<SessionUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UpdateProfileResponse>, AppError> {
    let (submission, attachment) = read_form(multipart?, state.max_picture_bytes).await?;

    state
        .profiles
        .update_profile(&username, &submission, attachment)
        .await?;

    Ok(Json(UpdateProfileResponse {
        message: "Profile updated successfully.".to_string(),
    }))
}

/// Collect text fields into a submission and pull out the picture part.
/// Unknown fields are ignored; a repeated field keeps its last value; an
/// empty picture part counts as no picture.
async fn read_form(
    mut multipart: Multipart,
    max_picture_bytes: usize,
) -> Result<(ProfileSubmission, Option<Attachment>), AppError> {
    let mut submission = ProfileSubmission::default();
    let mut attachment = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if name == PICTURE_FIELD {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_owned();
            let file_name = field.file_name().map(str::to_owned);
            let bytes = field.bytes().await?;

            if bytes.len() > max_picture_bytes {
                return Err(AppError::PayloadTooLarge);
            }
            attachment = (!bytes.is_empty()).then(|| Attachment {
                bytes,
                content_type,
                file_name,
            });
        } else {
            let value = field.text().await?;
            if !submission.set(&name, value) {
                tracing::debug!("Ignoring unknown form field {}", name);
            }
        }
    }

    Ok((submission, attachment))
}
