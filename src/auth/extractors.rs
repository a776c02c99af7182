//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;
use tracing::{debug, warn};

use super::models::User;
use super::resolver::IdentityResolver;
use super::token::{bearer_token, extract_identity, verify_session_token};
use crate::common::config::AuthConfig;
use crate::common::{safe_email_log, safe_token_log, ApiError, AppState};

/// Authenticated user extractor
///
/// Resolves the caller from the `Authorization` header, creating the user
/// row on first sight. Rejects with `ApiError` when no user can be resolved.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub user: User,
}

impl AuthedUser {
    pub fn id(&self) -> &str {
        &self.user.id
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(app_state): Extension<Arc<AppState>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        // a non-UTF-8 header counts as present but unusable
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .map(|h| h.to_str().unwrap_or_default());

        let resolver = IdentityResolver::new(app_state.db.clone(), app_state.dev_mode.clone());
        let user = authenticate(&resolver, &app_state.auth, header).await?;

        debug!(
            user_id = %user.id,
            email = %safe_email_log(&user.email),
            "Request authenticated"
        );

        Ok(AuthedUser { user })
    }
}

/// Authentication order:
/// 1. a signed session token resolves to its user;
/// 2. unsigned tokens, when allowed, resolve to the identity they claim;
///    in development mode a malformed claim falls through to step 3;
/// 3. in development mode anything else becomes the development user;
/// 4. otherwise the request is rejected.
pub async fn authenticate(
    resolver: &IdentityResolver,
    auth: &AuthConfig,
    header: Option<&str>,
) -> Result<User, ApiError> {
    if let Some(token) = bearer_token(header) {
        if let Some(claims) = verify_session_token(token, &auth.jwt_secret) {
            return resolver.session_user(&claims.sub).await;
        }
    }

    if auth.allow_unsigned_tokens {
        if let Some(identity) = extract_identity(header) {
            match resolver.resolve(Some(identity)).await {
                Err(ApiError::InvalidToken(reason)) if resolver.dev_mode_enabled() => {
                    debug!(reason = %reason, "Unusable unsigned token, using development identity");
                }
                result => return result,
            }
        }
    }

    if resolver.dev_mode_enabled() {
        return resolver.resolve(None).await;
    }

    match header {
        Some(value) => {
            warn!(
                token = %safe_token_log(value),
                "Authentication failed: unusable Authorization header"
            );
            Err(ApiError::InvalidToken("invalid bearer token".to_string()))
        }
        None => {
            warn!("Authentication failed: missing Authorization header");
            Err(ApiError::AuthenticationRequired(
                "missing credentials".to_string(),
            ))
        }
    }
}
