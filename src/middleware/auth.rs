// SPDX-License-Identifier: MIT

//! Session token middleware.
//!
//! The session credential is a signed JWT this service issues at login. It
//! embeds the Google access grant so every provider call can run with the
//! caller's own credentials without a store lookup.

use crate::error::AppError;
use crate::models::AccessGrant;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Session token claims.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// Subject (Google identity id)
    pub sub: String,
    /// The user's Google OAuth token bundle
    pub yt_access: AccessGrant,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated user extracted from the session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub yt_access: AccessGrant,
}

/// Middleware that requires a valid session token.
///
/// A missing Authorization header is 403, a header that is not a bearer
/// token is 401, and a token that fails verification is 403 again.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AppError::Forbidden)?
        .to_str()
        .map_err(|_| AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthorized)?;

    let key = DecodingKey::from_secret(&state.config.jwt_signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data =
        decode::<SessionClaims>(token, &key, &validation).map_err(|_| AppError::Forbidden)?;

    let auth_user = AuthUser {
        id: token_data.claims.sub,
        yt_access: token_data.claims.yt_access,
    };
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Create a session token for a logged-in user.
pub fn create_session_token(
    user_id: &str,
    access: &AccessGrant,
    signing_key: &[u8],
) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = SessionClaims {
        sub: user_id.to_string(),
        yt_access: access.clone(),
        iat: now,
        exp: now + 30 * 24 * 60 * 60, // 30 days
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}
