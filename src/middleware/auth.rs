use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::{errors::AppError, models::app_state::AppState, utils::jwt::verify_token};

/// Username of the authenticated caller, set by [`auth_middleware`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser(pub String);

/// Extract and verify the session token from the Authorization header
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized)?;

    let claims = verify_token(token, &state.jwt_secret)?;

    req.extensions_mut().insert(SessionUser(claims.sub));

    Ok(next.run(req).await)
}
