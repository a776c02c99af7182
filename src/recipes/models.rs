//! Recipe data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::common::decode_string_list;

/// Serving count recipes are written for before scaling
pub const BASE_SERVINGS: u32 = 2;
pub const DEFAULT_SERVINGS: u32 = 2;
pub const MAX_SUGGEST_SERVINGS: u32 = 10;

pub const DEFAULT_DIFFICULTY: &str = "medium";
pub const DEFAULT_COOKING_TIME: &str = "30";

/// A suggested recipe
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Recipe {
    pub recipe_name: String,
    pub ingredients_required: Vec<String>,
    pub missing_ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub difficulty_level: String,
    pub cooking_time: String,
    pub servings: u32,
}

/// `servings` for POST /recipes/suggest, from the query string or the body
#[derive(Deserialize, Debug, Default)]
pub struct SuggestParams {
    pub servings: Option<i64>,
}

/// saved_recipes row as stored; list columns are JSON text
#[derive(FromRow, Debug, Clone)]
pub struct SavedRecipeRow {
    pub id: String,
    pub owner_id: String,
    pub recipe_name: String,
    pub ingredients_required: Option<String>,
    pub missing_ingredients: Option<String>,
    pub instructions: Option<String>,
    pub difficulty_level: String,
    pub cooking_time: String,
    pub servings: i64,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SavedRecipe {
    pub id: String,
    pub owner_id: String,
    pub recipe_name: String,
    pub ingredients_required: Vec<String>,
    pub missing_ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub difficulty_level: String,
    pub cooking_time: String,
    pub servings: i64,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<SavedRecipeRow> for SavedRecipe {
    fn from(row: SavedRecipeRow) -> Self {
        Self {
            ingredients_required: decode_string_list(
                row.ingredients_required.as_deref(),
                "ingredients_required",
            ),
            missing_ingredients: decode_string_list(
                row.missing_ingredients.as_deref(),
                "missing_ingredients",
            ),
            instructions: decode_string_list(row.instructions.as_deref(), "instructions"),
            id: row.id,
            owner_id: row.owner_id,
            recipe_name: row.recipe_name,
            difficulty_level: row.difficulty_level,
            cooking_time: row.cooking_time,
            servings: row.servings,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct CreateSavedRecipeRequest {
    #[serde(default)]
    pub recipe_name: String,
    #[serde(default)]
    pub ingredients_required: Vec<String>,
    #[serde(default)]
    pub missing_ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    pub difficulty_level: Option<String>,
    pub cooking_time: Option<String>,
    pub servings: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct UpdateSavedRecipeRequest {
    pub recipe_name: Option<String>,
    pub ingredients_required: Option<Vec<String>>,
    pub missing_ingredients: Option<Vec<String>>,
    pub instructions: Option<Vec<String>>,
    pub difficulty_level: Option<String>,
    pub cooking_time: Option<String>,
    pub servings: Option<i64>,
    pub notes: Option<String>,
}

/// GET /saved-recipes paging
#[derive(Deserialize, Debug, Default)]
pub struct ListSavedRecipesQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}
