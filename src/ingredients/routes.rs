// src/ingredients/routes.rs

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// # Routes
/// - `GET/POST /ingredients`
/// - `POST /ingredients/sync`
/// - `GET/PUT/DELETE /ingredients/:id`
pub fn ingredients_routes() -> Router {
    Router::new()
        .route(
            "/ingredients",
            get(handlers::list_ingredients).post(handlers::create_ingredient),
        )
        .route("/ingredients/sync", post(handlers::sync_ingredients))
        .route(
            "/ingredients/:id",
            get(handlers::get_ingredient)
                .put(handlers::update_ingredient)
                .delete(handlers::delete_ingredient),
        )
}
