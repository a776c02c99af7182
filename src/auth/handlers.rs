//! Authentication handlers

use axum::extract::{Extension, Json};
use std::sync::Arc;
use tracing::{debug, info};

use super::extractors::AuthedUser;
use super::google::verify_id_token;
use super::models::{AuthResponse, GoogleAuthRequest, User};
use super::resolver::IdentityResolver;
use super::token::{issue_session_token, IdentityProvider};
use crate::common::{safe_email_log, ApiError, AppState};

/// POST /auth/google
/// Exchanges a Google ID token for a session token
///
/// # Request Body
/// ```json
/// { "token": "<google id token>" }
/// ```
/// `id_token` is accepted as the field name too.
///
/// # Response
/// ```json
/// {
///   "access_token": "<jwt>",
///   "token_type": "bearer",
///   "expires_in": 604800,
///   "user": { ... }
/// }
/// ```
pub async fn google_auth(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<GoogleAuthRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    info!("🔐 Received Google auth request");

    if payload.token.trim().is_empty() {
        return Err(ApiError::BadRequest("token is required".to_string()));
    }

    let identity = verify_id_token(&state.http, &payload.token, &state.auth, &state.dev_mode).await?;

    let resolver = IdentityResolver::new(state.db.clone(), state.dev_mode.clone());
    let user = resolver
        .ensure_external_user(IdentityProvider::Google, &identity.sub, Some(&identity.profile))
        .await?;

    if !user.is_active {
        return Err(ApiError::AuthenticationRequired(
            "account is disabled".to_string(),
        ));
    }

    let access_token = issue_session_token(&user.id, &state.auth)?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        "Google sign-in completed"
    );

    Ok(Json(AuthResponse {
        access_token,
        token_type: "bearer".to_string(),
        expires_in: state.auth.session_ttl_hours * 3600,
        user,
    }))
}

/// GET /auth/me
pub async fn me_handler(authed: AuthedUser) -> Json<User> {
    debug!(user_id = %authed.id(), "Fetching current user");
    Json(authed.user)
}
