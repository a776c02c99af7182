//! # Ingredients Module
//!
//! The caller's pantry: owner-scoped CRUD plus merging of ingredients that
//! were cached client-side before the user signed in.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;


pub use routes::ingredients_routes;
pub use services::IngredientsService;
