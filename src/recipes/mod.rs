//! # Recipes Module
//!
//! Recipe suggestions generated from the caller's pantry, serving-size
//! scaling, and the caller's saved recipe collection.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod scaling;
pub mod services;
pub mod suggestions;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::recipes_routes;
