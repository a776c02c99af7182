// src/ingredients/handlers.rs

use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::info;

use super::models::{
    CreateIngredientRequest, Ingredient, Persisted, SyncIngredientsRequest, SyncOutcome,
    UpdateIngredientRequest,
};
use super::services::IngredientsService;
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState};

/// GET /ingredients - List the caller's ingredients
pub async fn list_ingredients(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
) -> Result<Json<Vec<Ingredient>>, ApiError> {
    let service = IngredientsService::new(state.db.clone());
    Ok(Json(service.list(authed.id()).await?))
}

/// POST /ingredients - Add an ingredient
///
/// 201 when stored, 202 when the record could only be built in memory
/// (`persisted: false` plus `detail` in the body).
pub async fn create_ingredient(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Json(request): Json<CreateIngredientRequest>,
) -> Result<(StatusCode, Json<Persisted<Ingredient>>), ApiError> {
    info!(user_id = %authed.id(), name = %request.name, "Creating ingredient");

    let service = IngredientsService::new(state.db.clone());
    let outcome = service.create(authed.id(), request).await?;

    let status = if outcome.persisted {
        StatusCode::CREATED
    } else {
        StatusCode::ACCEPTED
    };
    Ok((status, Json(outcome)))
}

/// GET /ingredients/:id
pub async fn get_ingredient(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Path(ingredient_id): Path<String>,
) -> Result<Json<Ingredient>, ApiError> {
    let service = IngredientsService::new(state.db.clone());
    Ok(Json(service.get(authed.id(), &ingredient_id).await?))
}

/// PUT /ingredients/:id - Partial update
pub async fn update_ingredient(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Path(ingredient_id): Path<String>,
    Json(request): Json<UpdateIngredientRequest>,
) -> Result<Json<Ingredient>, ApiError> {
    info!(user_id = %authed.id(), ingredient_id = %ingredient_id, "Updating ingredient");

    let service = IngredientsService::new(state.db.clone());
    Ok(Json(
        service.update(authed.id(), &ingredient_id, request).await?,
    ))
}

/// DELETE /ingredients/:id
pub async fn delete_ingredient(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Path(ingredient_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let service = IngredientsService::new(state.db.clone());
    service.delete(authed.id(), &ingredient_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /ingredients/sync - Merge a locally cached batch into the account
pub async fn sync_ingredients(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Json(request): Json<SyncIngredientsRequest>,
) -> Result<Json<SyncOutcome>, ApiError> {
    info!(
        user_id = %authed.id(),
        batch_size = request.items.len(),
        "Syncing local ingredients"
    );

    let service = IngredientsService::new(state.db.clone());
    Ok(Json(service.sync(authed.id(), request.items).await?))
}
