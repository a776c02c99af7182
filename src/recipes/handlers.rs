// src/recipes/handlers.rs

use axum::{
    extract::{Extension, Json, Path, Query},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::info;

use super::models::{
    CreateSavedRecipeRequest, ListSavedRecipesQuery, Recipe, SavedRecipe, SuggestParams,
    UpdateSavedRecipeRequest,
};
use super::services::SavedRecipesService;
use super::suggestions::RecipeSuggester;
use super::validators::suggest_servings;
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState};

/// POST /recipes/suggest - Suggest a recipe from the caller's pantry
///
/// `servings` (1-10, default 2) may be given as a query parameter or in a
/// JSON body; the query parameter wins.
pub async fn suggest_recipe(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Query(query): Query<SuggestParams>,
    body: Option<Json<SuggestParams>>,
) -> Result<Json<Recipe>, ApiError> {
    let requested = query
        .servings
        .or_else(|| body.and_then(|Json(b)| b.servings));
    let servings = suggest_servings(requested)?;

    info!(user_id = %authed.id(), servings = servings, "Suggesting recipe");

    let recipe = RecipeSuggester::from_state(&state)
        .suggest(authed.id(), servings)
        .await?;
    Ok(Json(recipe))
}

/// GET /saved-recipes?skip=&limit=
pub async fn list_saved_recipes(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Query(query): Query<ListSavedRecipesQuery>,
) -> Result<Json<Vec<SavedRecipe>>, ApiError> {
    let service = SavedRecipesService::new(state.db.clone());
    Ok(Json(
        service.list(authed.id(), query.skip, query.limit).await?,
    ))
}

/// POST /saved-recipes
pub async fn create_saved_recipe(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Json(request): Json<CreateSavedRecipeRequest>,
) -> Result<(StatusCode, Json<SavedRecipe>), ApiError> {
    let service = SavedRecipesService::new(state.db.clone());
    let recipe = service.create(authed.id(), request).await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

/// GET /saved-recipes/:id
pub async fn get_saved_recipe(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Path(recipe_id): Path<String>,
) -> Result<Json<SavedRecipe>, ApiError> {
    let service = SavedRecipesService::new(state.db.clone());
    Ok(Json(service.get(authed.id(), &recipe_id).await?))
}

/// PUT /saved-recipes/:id - Partial update
pub async fn update_saved_recipe(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Path(recipe_id): Path<String>,
    Json(request): Json<UpdateSavedRecipeRequest>,
) -> Result<Json<SavedRecipe>, ApiError> {
    info!(user_id = %authed.id(), recipe_id = %recipe_id, "Updating saved recipe");

    let service = SavedRecipesService::new(state.db.clone());
    Ok(Json(service.update(authed.id(), &recipe_id, request).await?))
}

/// DELETE /saved-recipes/:id
pub async fn delete_saved_recipe(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Path(recipe_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let service = SavedRecipesService::new(state.db.clone());
    service.delete(authed.id(), &recipe_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
