// src/recipes/services.rs
//! Owner-scoped saved recipe storage

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{error, info, warn};

use super::models::{
    CreateSavedRecipeRequest, SavedRecipe, SavedRecipeRow, UpdateSavedRecipeRequest,
    DEFAULT_COOKING_TIME, DEFAULT_DIFFICULTY, DEFAULT_SERVINGS,
};
use super::validators::SavedRecipeValidator;
use crate::common::{encode_string_list, generate_saved_recipe_id, ApiError, Validator};

const SELECT_SAVED_RECIPE: &str = r#"
    SELECT id, owner_id, recipe_name, ingredients_required, missing_ingredients,
           instructions, difficulty_level, cooking_time, servings, notes,
           created_at, updated_at
    FROM saved_recipes
"#;

pub const MAX_PAGE_SIZE: i64 = 100;

pub struct SavedRecipesService {
    db: SqlitePool,
}

impl SavedRecipesService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Newest first. `limit` is clamped to 1..=100, `skip` to >= 0.
    pub async fn list(
        &self,
        owner_id: &str,
        skip: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<SavedRecipe>, ApiError> {
        let skip = skip.unwrap_or(0).max(0);
        let limit = limit.unwrap_or(MAX_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

        let rows = sqlx::query_as::<_, SavedRecipeRow>(&format!(
            "{} WHERE owner_id = ? ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
            SELECT_SAVED_RECIPE
        ))
        .bind(owner_id)
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.db)
        .await
        .map_err(|e| {
            error!(error = %e, owner_id = %owner_id, "Database error listing saved recipes");
            ApiError::StoreUnavailable(e)
        })?;

        Ok(rows.into_iter().map(SavedRecipe::from).collect())
    }

    pub async fn get(&self, owner_id: &str, recipe_id: &str) -> Result<SavedRecipe, ApiError> {
        sqlx::query_as::<_, SavedRecipeRow>(&format!(
            "{} WHERE id = ? AND owner_id = ?",
            SELECT_SAVED_RECIPE
        ))
        .bind(recipe_id)
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await?
        .map(SavedRecipe::from)
        .ok_or_else(|| ApiError::NotFound("Saved recipe not found".to_string()))
    }

    pub async fn create(
        &self,
        owner_id: &str,
        request: CreateSavedRecipeRequest,
    ) -> Result<SavedRecipe, ApiError> {
        SavedRecipeValidator.validate(&request).into_result()?;

        let now = Utc::now().to_rfc3339();
        let recipe = SavedRecipe {
            id: generate_saved_recipe_id(),
            owner_id: owner_id.to_string(),
            recipe_name: request.recipe_name.trim().to_string(),
            ingredients_required: request.ingredients_required,
            missing_ingredients: request.missing_ingredients,
            instructions: request.instructions,
            difficulty_level: request
                .difficulty_level
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DIFFICULTY.to_string()),
            cooking_time: request
                .cooking_time
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_COOKING_TIME.to_string()),
            servings: request.servings.unwrap_or(i64::from(DEFAULT_SERVINGS)),
            notes: request.notes,
            created_at: now.clone(),
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO saved_recipes (
                id, owner_id, recipe_name, ingredients_required, missing_ingredients,
                instructions, difficulty_level, cooking_time, servings, notes,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&recipe.id)
        .bind(&recipe.owner_id)
        .bind(&recipe.recipe_name)
        .bind(encode_string_list(&recipe.ingredients_required))
        .bind(encode_string_list(&recipe.missing_ingredients))
        .bind(encode_string_list(&recipe.instructions))
        .bind(&recipe.difficulty_level)
        .bind(&recipe.cooking_time)
        .bind(recipe.servings)
        .bind(&recipe.notes)
        .bind(&recipe.created_at)
        .bind(&recipe.updated_at)
        .execute(&self.db)
        .await
        .map_err(|e| {
            error!(error = %e, owner_id = %owner_id, "Database error saving recipe");
            ApiError::StoreUnavailable(e)
        })?;

        info!(
            owner_id = %owner_id,
            recipe_id = %recipe.id,
            recipe_name = %recipe.recipe_name,
            "Recipe saved"
        );

        Ok(recipe)
    }

    /// Applies only the supplied fields
    pub async fn update(
        &self,
        owner_id: &str,
        recipe_id: &str,
        request: UpdateSavedRecipeRequest,
    ) -> Result<SavedRecipe, ApiError> {
        SavedRecipeValidator.validate(&request).into_result()?;

        let result = sqlx::query(
            r#"
            UPDATE saved_recipes
            SET recipe_name = COALESCE(?, recipe_name),
                ingredients_required = COALESCE(?, ingredients_required),
                missing_ingredients = COALESCE(?, missing_ingredients),
                instructions = COALESCE(?, instructions),
                difficulty_level = COALESCE(?, difficulty_level),
                cooking_time = COALESCE(?, cooking_time),
                servings = COALESCE(?, servings),
                notes = COALESCE(?, notes),
                updated_at = ?
            WHERE id = ? AND owner_id = ?
            "#,
        )
        .bind(request.recipe_name.as_deref().map(str::trim))
        .bind(request.ingredients_required.as_deref().map(encode_string_list))
        .bind(request.missing_ingredients.as_deref().map(encode_string_list))
        .bind(request.instructions.as_deref().map(encode_string_list))
        .bind(request.difficulty_level.as_deref())
        .bind(request.cooking_time.as_deref())
        .bind(request.servings)
        .bind(request.notes.as_deref())
        .bind(Utc::now().to_rfc3339())
        .bind(recipe_id)
        .bind(owner_id)
        .execute(&self.db)
        .await
        .map_err(|e| {
            error!(
                error = %e,
                owner_id = %owner_id,
                recipe_id = %recipe_id,
                "Database error updating saved recipe"
            );
            ApiError::StoreUnavailable(e)
        })?;

        if result.rows_affected() == 0 {
            warn!(
                owner_id = %owner_id,
                recipe_id = %recipe_id,
                "Saved recipe not found or owned by someone else"
            );
            return Err(ApiError::NotFound("Saved recipe not found".to_string()));
        }

        self.get(owner_id, recipe_id).await
    }

    pub async fn delete(&self, owner_id: &str, recipe_id: &str) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM saved_recipes WHERE id = ? AND owner_id = ?")
            .bind(recipe_id)
            .bind(owner_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            warn!(
                owner_id = %owner_id,
                recipe_id = %recipe_id,
                "Saved recipe not found or owned by someone else, nothing deleted"
            );
            return Err(ApiError::NotFound("Saved recipe not found".to_string()));
        }

        info!(owner_id = %owner_id, recipe_id = %recipe_id, "Saved recipe deleted");
        Ok(())
    }
}
