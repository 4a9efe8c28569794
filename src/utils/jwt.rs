//! HS256 session tokens.
//!
//! The `sub` claim carries the username of the profile the bearer is allowed
//! to update. Tokens are minted by `profile_admin token` (or an upstream
//! login service sharing the secret) and checked by the auth middleware.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Lifetime of a minted session when none is given
pub const DEFAULT_SESSION_HOURS: i64 = 24;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Profile username bound to the session
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

/// Mint a session bound to `username`, valid for `expiry_hours`.
pub fn generate_token(username: &str, secret: &str, expiry_hours: i64) -> Result<String, AppError> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(expiry_hours);

    let claims = Claims {
        sub: username.to_string(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalError(format!("Failed to sign session token: {}", e)))
}

/// Check signature and expiry, then return the claims. A token without a
/// subject cannot be bound to a profile and is rejected.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => AppError::InvalidToken,
    })?;

    if token_data.claims.sub.is_empty() {
        return Err(AppError::InvalidToken);
    }

    Ok(token_data.claims)
}
