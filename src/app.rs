use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    api::{
        health::health_check,
        profile::{get_profile, update_profile},
    },
    middleware::auth::auth_middleware,
    models::app_state::AppState,
};

/// Room for the text fields of a multipart body on top of the picture
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::profile::update_profile,
        crate::api::profile::get_profile,
        crate::api::health::health_check,
    ),
    components(
        schemas(
            crate::models::profile::ProfileSubmission,
            crate::models::profile::UserProfile,
            crate::models::profile::MembershipStatus,
            crate::models::profile::ProfileResponse,
            crate::models::profile::UpdateProfileResponse,
            crate::models::profile::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Profile", description = "Pilot profile endpoints"),
        (name = "Health", description = "Service health")
    ),
    info(
        title = "Flight Profile API",
        version = "0.1.0",
        description = "User profile management for aviation enthusiasts"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn router(state: AppState) -> Router {
    let user_routes = Router::new()
        .route("/user/update", post(update_profile))
        .route("/user/profile", get(get_profile))
        .layer(DefaultBodyLimit::max(
            state.max_picture_bytes + FORM_OVERHEAD_BYTES,
        ))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/api/health", get(health_check))
        .merge(user_routes)
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}
