// src/recipes/routes.rs

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// # Routes
/// - `POST /recipes/suggest`
/// - `GET/POST /saved-recipes`
/// - `GET/PUT/DELETE /saved-recipes/:id`
pub fn recipes_routes() -> Router {
    Router::new()
        .route("/recipes/suggest", post(handlers::suggest_recipe))
        .route(
            "/saved-recipes",
            get(handlers::list_saved_recipes).post(handlers::create_saved_recipe),
        )
        .route(
            "/saved-recipes/:id",
            get(handlers::get_saved_recipe)
                .put(handlers::update_saved_recipe)
                .delete(handlers::delete_saved_recipe),
        )
}
