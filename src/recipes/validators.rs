// src/recipes/validators.rs

use super::models::{
    CreateSavedRecipeRequest, UpdateSavedRecipeRequest, DEFAULT_SERVINGS, MAX_SUGGEST_SERVINGS,
};
use crate::common::{ApiError, ValidationResult, Validator};

const MAX_RECIPE_NAME_LEN: usize = 200;
const MAX_SAVED_SERVINGS: i64 = 100;

pub struct SavedRecipeValidator;

fn check_list(result: &mut ValidationResult, field: &str, items: &[String], label: &str) {
    if items.iter().all(|item| item.trim().is_empty()) {
        result.add_error(field, &format!("{} must not be empty", label));
    }
}

fn check_servings(result: &mut ValidationResult, servings: i64) {
    if !(1..=MAX_SAVED_SERVINGS).contains(&servings) {
        result.add_error(
            "servings",
            &format!("Servings must be between 1 and {}", MAX_SAVED_SERVINGS),
        );
    }
}

impl Validator<CreateSavedRecipeRequest> for SavedRecipeValidator {
    fn validate(&self, data: &CreateSavedRecipeRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.check_text("recipe_name", &data.recipe_name, "Recipe name", MAX_RECIPE_NAME_LEN);
        check_list(
            &mut result,
            "ingredients_required",
            &data.ingredients_required,
            "Ingredients",
        );
        check_list(&mut result, "instructions", &data.instructions, "Instructions");
        if let Some(servings) = data.servings {
            check_servings(&mut result, servings);
        }

        result
    }
}

impl Validator<UpdateSavedRecipeRequest> for SavedRecipeValidator {
    fn validate(&self, data: &UpdateSavedRecipeRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Some(name) = &data.recipe_name {
            result.check_text("recipe_name", name, "Recipe name", MAX_RECIPE_NAME_LEN);
        }
        if let Some(items) = &data.ingredients_required {
            check_list(&mut result, "ingredients_required", items, "Ingredients");
        }
        if let Some(items) = &data.instructions {
            check_list(&mut result, "instructions", items, "Instructions");
        }
        if let Some(servings) = data.servings {
            check_servings(&mut result, servings);
        }

        result
    }
}

/// Servings for a suggestion: 1..=10, defaulting to 2
pub fn suggest_servings(requested: Option<i64>) -> Result<u32, ApiError> {
    let servings = requested.unwrap_or(i64::from(DEFAULT_SERVINGS));
    if servings < 1 || servings > i64::from(MAX_SUGGEST_SERVINGS) {
        return Err(ApiError::ValidationError(format!(
            "servings: Servings must be between 1 and {}",
            MAX_SUGGEST_SERVINGS
        )));
    }
    Ok(servings as u32)
}
