use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::models::app_state::AppState;

/// Report whether the profile store answers
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service health")),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    match state.profiles.health().await {
        Ok(()) => Json(json!({
            "status": "healthy",
            "store": "connected"
        })),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            Json(json!({
                "status": "unhealthy",
                "store": "disconnected"
            }))
        }
    }
}
