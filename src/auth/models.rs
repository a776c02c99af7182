//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Session token claims
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
}

/// User database model
#[derive(FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    pub external_provider_id: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Profile data supplied by an identity provider on sign-in
#[derive(Debug, Clone)]
pub struct ExternalProfile {
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

/// POST /auth/google body
#[derive(Deserialize, Debug)]
pub struct GoogleAuthRequest {
    #[serde(alias = "id_token")]
    pub token: String,
}

#[derive(Serialize, Debug)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}
