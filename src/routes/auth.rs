// SPDX-License-Identifier: MIT

//! Google OAuth login routes.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::create_session_token;
use crate::models::{Channel, PlaylistItem};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login-link", get(login_link))
        .route("/login-callback", get(login_callback))
}

#[derive(Serialize)]
pub struct LoginLinkResponse {
    pub status: bool,
    pub link: String,
}

/// Hand out the Google consent URL. No side effects.
async fn login_link(State(state): State<Arc<AppState>>) -> Json<LoginLinkResponse> {
    Json(LoginLinkResponse {
        status: true,
        link: state.oauth.auth_url(),
    })
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub msg: String,
    pub user: LoginUser,
}

/// Public profile plus the session credential. `access` is the JWT this
/// service signs, not the raw Google grant.
#[derive(Serialize)]
pub struct LoginUser {
    pub name: String,
    pub profile: Option<String>,
    pub channel: Option<Channel>,
    pub uploads: HashMap<String, PlaylistItem>,
    pub access: String,
}

#[derive(Serialize)]
struct CallbackErrorResponse {
    status: bool,
    msg: String,
    error: String,
}

/// OAuth callback: exchange the code, verify identity, upsert the user
/// record, and issue a session token.
async fn login_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Response> {
    // The provider reported a consent failure; do not contact it further.
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error returned by Google");
        let body = CallbackErrorResponse {
            status: false,
            msg: "Unable to login please try again".to_string(),
            error,
        };
        return Ok((StatusCode::NOT_ACCEPTABLE, Json(body)).into_response());
    }

    let code = params
        .code
        .ok_or_else(|| AppError::BadRequest("Missing 'code' query parameter".to_string()))?;

    tracing::info!("Exchanging authorization code for tokens");
    let grant = state.oauth.exchange_code(&code).await?;

    let id_token = grant
        .id_token
        .as_deref()
        .ok_or_else(|| AppError::OAuth("Token response carried no ID token".to_string()))?;

    let claims = state.oauth.verify_id_token(id_token).await?;

    let user = state
        .store
        .upsert_login(&claims.sub, &claims.name, claims.picture.clone(), grant)
        .await?;

    tracing::info!(user_id = %user.id, name = %user.name, "Login successful");

    let session = create_session_token(&user.id, &user.access, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Session token creation failed: {}", e)))?;

    let body = LoginResponse {
        msg: "Login Successful".to_string(),
        user: LoginUser {
            name: user.name,
            profile: user.profile,
            channel: user.channel,
            uploads: user.uploads,
            access: session,
        },
    };

    Ok(Json(body).into_response())
}
