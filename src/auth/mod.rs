//! # Auth Module
//!
//! Turns an `Authorization` header into a persisted user:
//! - bearer token parsing and HS256 session tokens
//! - lazy user creation and the development identity
//! - Google sign-in
//! - `AuthedUser` extractor for protected routes

pub mod extractors;
pub mod google;
pub mod handlers;
pub mod models;
pub mod resolver;
pub mod routes;
pub mod token;

#[cfg(test)]
mod tests;

pub use extractors::AuthedUser;
pub use routes::auth_routes;
