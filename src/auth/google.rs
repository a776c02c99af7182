//! Google ID token verification through the tokeninfo endpoint
//! Docs: https://developers.google.com/identity/sign-in/web/backend-auth

use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, warn};

use super::models::ExternalProfile;
use crate::common::config::AuthConfig;
use crate::common::dev_mode::DevModeConfig;
use crate::common::{safe_email_log, ApiError};

pub const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// A verified Google identity
#[derive(Debug, Clone)]
pub struct GoogleIdentity {
    /// Google's stable subject id
    pub sub: String,
    pub profile: ExternalProfile,
}

impl GoogleIdentity {
    /// Stand-in identity used in development mode when no client id is set
    pub fn mock() -> Self {
        Self {
            sub: "mock-google-id-123456789".to_string(),
            profile: ExternalProfile {
                email: "test@example.com".to_string(),
                name: "Test User".to_string(),
                picture: None,
            },
        }
    }
}

/// Verifies `id_token`. In development mode without a configured client id
/// no call is made and the mock identity is returned.
pub async fn verify_id_token(
    http: &Client,
    id_token: &str,
    auth: &AuthConfig,
    dev_mode: &DevModeConfig,
) -> Result<GoogleIdentity, ApiError> {
    if auth.google_client_id.is_none() && dev_mode.is_enabled() {
        warn!("DEV MODE: GOOGLE_CLIENT_ID not set, using mock Google identity");
        return Ok(GoogleIdentity::mock());
    }

    verify_with_endpoint(
        http,
        TOKENINFO_URL,
        id_token,
        auth.google_client_id.as_deref(),
    )
    .await
}

pub async fn verify_with_endpoint(
    http: &Client,
    endpoint: &str,
    id_token: &str,
    client_id: Option<&str>,
) -> Result<GoogleIdentity, ApiError> {
    debug!("Validating Google ID token with tokeninfo endpoint");

    let resp = http
        .get(endpoint)
        .query(&[("id_token", id_token)])
        .send()
        .await
        .map_err(|e| {
            error!(error = %e, endpoint = %endpoint, "HTTP error contacting Google tokeninfo endpoint");
            ApiError::UpstreamUnavailable("google token validation service unavailable".to_string())
        })?;

    let status = resp.status();
    debug!(http_status = %status, "Received response from Google tokeninfo endpoint");

    match status.as_u16() {
        200..=299 => {}
        400 | 401 => {
            warn!(http_status = %status, "Google rejected the ID token");
            return Err(ApiError::InvalidToken(
                "expired or invalid id_token".to_string(),
            ));
        }
        _ => {
            warn!(http_status = %status, "Google tokeninfo returned error status");
            return Err(ApiError::UpstreamUnavailable(format!(
                "google token validation failed with status {}",
                status
            )));
        }
    }

    let body = resp.json::<Value>().await.map_err(|e| {
        error!(error = %e, "Failed to parse Google tokeninfo JSON response");
        ApiError::UpstreamUnavailable("malformed tokeninfo response".to_string())
    })?;

    identity_from_tokeninfo(&body, client_id, Utc::now().timestamp())
}

/// Validates a tokeninfo payload and extracts the identity.
///
/// tokeninfo encodes numbers and booleans as strings, both forms are accepted.
pub fn identity_from_tokeninfo(
    body: &Value,
    client_id: Option<&str>,
    now: i64,
) -> Result<GoogleIdentity, ApiError> {
    let str_field = |key: &str| {
        body.get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let (Some(sub), Some(email)) = (str_field("sub"), str_field("email")) else {
        warn!("Google token missing required fields (email/sub)");
        return Err(ApiError::BadRequest(
            "token missing required fields".to_string(),
        ));
    };

    let exp = body.get("exp").and_then(|v| match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse::<i64>().ok(),
        _ => None,
    });
    if let Some(exp) = exp {
        if exp < now {
            warn!(token_exp = exp, current_time = now, "Google token has expired");
            return Err(ApiError::InvalidToken("token has expired".to_string()));
        }
    }

    if let Some(client_id) = client_id {
        match body.get("aud").and_then(|v| v.as_str()) {
            Some(aud) if aud == client_id => {}
            aud => {
                warn!(
                    token_audience = ?aud,
                    expected_client_id = %client_id,
                    "Google token audience validation failed"
                );
                return Err(ApiError::InvalidToken(
                    "token audience mismatch".to_string(),
                ));
            }
        }
    }

    let email_verified = match body.get("email_verified") {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s != "false",
        _ => true,
    };
    if !email_verified {
        warn!(email = %safe_email_log(&email), "Google account email is not verified");
        return Err(ApiError::InvalidToken("email not verified".to_string()));
    }

    let name = str_field("name").unwrap_or_else(|| email.clone());

    Ok(GoogleIdentity {
        sub,
        profile: ExternalProfile {
            email,
            name,
            picture: str_field("picture"),
        },
    })
}
