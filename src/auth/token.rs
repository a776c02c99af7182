//! Bearer token parsing and session tokens
//!
//! Two token kinds reach the API:
//! - signed session tokens (HS256 JWT) issued by `POST /auth/google`;
//! - unsigned legacy tokens, either `google_<provider id>[_<anything>]` or a
//!   bare internal user id. These are identity *claims*, not credentials, and
//!   are only honoured when `ALLOW_UNSIGNED_TOKENS` is on.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, error};

use super::models::Claims;
use crate::common::config::AuthConfig;
use crate::common::ApiError;

pub const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityProvider {
    Google,
}

impl IdentityProvider {
    const ALL: [IdentityProvider; 1] = [IdentityProvider::Google];

    /// Prefix marking an unsigned token as carrying this provider's id
    pub fn token_marker(&self) -> &'static str {
        match self {
            IdentityProvider::Google => "google_",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityProvider::Google => "google",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IdentityProvider::Google => "Google",
        }
    }
}

/// Identity claimed by a bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenIdentity {
    External {
        provider: IdentityProvider,
        provider_id: String,
    },
    Internal(String),
}

/// Returns the raw token of a `Bearer <token>` header value
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let token = header?.strip_prefix(BEARER_PREFIX)?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Parses an unsigned token into the identity it claims
///
/// Provider tokens keep only the segment after the marker up to the next
/// `_`. Any other token is taken whole as the internal user id, underscores
/// included.
pub fn parse_token(token: &str) -> Option<TokenIdentity> {
    for provider in IdentityProvider::ALL {
        if let Some(rest) = token.strip_prefix(provider.token_marker()) {
            let provider_id = rest.split('_').next().unwrap_or_default();
            if provider_id.is_empty() {
                return None;
            }
            return Some(TokenIdentity::External {
                provider,
                provider_id: provider_id.to_string(),
            });
        }
    }

    Some(TokenIdentity::Internal(token.to_string()))
}

/// Token Identity Extractor: `Authorization` header value to claimed identity.
/// Never fails; anything unusable is "no identity".
pub fn extract_identity(header: Option<&str>) -> Option<TokenIdentity> {
    bearer_token(header).and_then(parse_token)
}

pub fn issue_session_token(user_id: &str, auth: &AuthConfig) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(auth.session_ttl_hours)).timestamp() as usize,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
    )
    .map_err(|e| {
        error!(error = %e, user_id = %user_id, "JWT encoding error");
        ApiError::InternalServer("could not issue session token".to_string())
    })
}

/// Verifies a session token. None for anything that is not a valid,
/// unexpired token signed with `secret`.
pub fn verify_session_token(token: &str, secret: &str) -> Option<Claims> {
    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    ) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            debug!(error = %e, "Bearer value is not a valid session token");
            None
        }
    }
}
