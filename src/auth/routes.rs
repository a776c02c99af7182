//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /auth/google` - Google sign-in, returns a session token
/// - `GET /auth/me` - Current user
pub fn auth_routes() -> Router {
    Router::new()
        .route("/auth/google", post(handlers::google_auth))
        .route("/auth/me", get(handlers::me_handler))
}
