// src/ingredients/validators.rs

use super::models::{CreateIngredientRequest, UpdateIngredientRequest};
use crate::common::{ValidationResult, Validator};

const MAX_NAME_LEN: usize = 100;
const MAX_UNIT_LEN: usize = 50;

pub struct IngredientValidator;

fn check_quantity(result: &mut ValidationResult, quantity: f64) {
    if !quantity.is_finite() || quantity <= 0.0 {
        result.add_error("quantity", "Quantity must be a positive number");
    }
}

impl Validator<CreateIngredientRequest> for IngredientValidator {
    fn validate(&self, data: &CreateIngredientRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.check_text("name", &data.name, "Ingredient name", MAX_NAME_LEN);
        check_quantity(&mut result, data.quantity);
        result.check_text("unit", &data.unit, "Unit", MAX_UNIT_LEN);

        result
    }
}

impl Validator<UpdateIngredientRequest> for IngredientValidator {
    fn validate(&self, data: &UpdateIngredientRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Some(name) = &data.name {
            result.check_text("name", name, "Ingredient name", MAX_NAME_LEN);
        }
        if let Some(quantity) = data.quantity {
            check_quantity(&mut result, quantity);
        }
        if let Some(unit) = &data.unit {
            result.check_text("unit", unit, "Unit", MAX_UNIT_LEN);
        }

        result
    }
}
