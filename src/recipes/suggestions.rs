// src/recipes/suggestions.rs
//! Recipe suggestions from the caller's pantry
//!
//! Flow: pantry names → prompt → generator → JSON extraction →
//! normalization → servings attached → quantities scaled from the base
//! serving count.

use serde_json::{Map, Value};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::models::{Recipe, BASE_SERVINGS, DEFAULT_COOKING_TIME, DEFAULT_DIFFICULTY};
use super::scaling::scale_ingredients;
use crate::common::{ApiError, AppState};
use crate::ingredients::IngredientsService;
use crate::services::{GenerationError, TextGenerator};

pub const SYSTEM_PROMPT: &str =
    "You are a professional chef who provides recipe suggestions in JSON format.";

const UNNAMED_RECIPE: &str = "Unnamed Recipe";

#[derive(Debug, thiserror::Error)]
pub enum SuggestionError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Could not parse recipe from generation reply: {0}")]
    Parse(String),
}

impl From<SuggestionError> for ApiError {
    fn from(e: SuggestionError) -> Self {
        ApiError::UpstreamUnavailable(e.to_string())
    }
}

pub struct RecipeSuggester {
    ingredients: IngredientsService,
    generator: Option<Arc<dyn TextGenerator>>,
    mock_recipes: bool,
}

impl RecipeSuggester {
    pub fn new(
        db: SqlitePool,
        generator: Option<Arc<dyn TextGenerator>>,
        mock_recipes: bool,
    ) -> Self {
        Self {
            ingredients: IngredientsService::new(db),
            generator,
            mock_recipes,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.db.clone(), state.generator.clone(), state.mock_recipes)
    }

    /// Suggests a recipe for `servings` people from everything `owner_id` has.
    ///
    /// The pantry read finishes before the generator is called.
    pub async fn suggest(&self, owner_id: &str, servings: u32) -> Result<Recipe, ApiError> {
        let names = self.ingredients.names(owner_id).await?;

        if names.is_empty() {
            debug!(owner_id = %owner_id, "Empty pantry, returning placeholder recipe");
            return Ok(no_recipe(servings));
        }

        let mut recipe = match &self.generator {
            Some(generator) => {
                generate_recipe(generator.as_ref(), &names, servings)
                    .await
                    .map_err(|e| {
                        error!(error = %e, owner_id = %owner_id, "Recipe generation failed");
                        ApiError::from(e)
                    })?
            }
            None if self.mock_recipes => {
                warn!(owner_id = %owner_id, "No generation credential configured, serving mock recipe");
                mock_recipe(&names, servings)
            }
            None => return Err(SuggestionError::from(GenerationError::NotConfigured).into()),
        };

        recipe.ingredients_required =
            scale_ingredients(&recipe.ingredients_required, servings, BASE_SERVINGS);

        info!(
            owner_id = %owner_id,
            recipe_name = %recipe.recipe_name,
            servings = servings,
            pantry_size = names.len(),
            "Recipe suggested"
        );

        Ok(recipe)
    }
}

/// Calls the generator and turns its reply into a recipe. Servings are
/// attached but quantities are not scaled yet.
pub async fn generate_recipe(
    generator: &dyn TextGenerator,
    ingredients: &[String],
    servings: u32,
) -> Result<Recipe, SuggestionError> {
    let prompt = build_prompt(ingredients, servings);
    let reply = generator.generate(SYSTEM_PROMPT, &prompt).await?;
    let fields = parse_recipe_reply(&reply)?;
    Ok(normalize(fields, servings))
}

pub fn build_prompt(ingredients: &[String], servings: u32) -> String {
    format!(
        r#"You are a professional chef. Create a recipe for {servings} servings using these ingredients: {list}.
Return ONLY a valid JSON object with this exact structure, no other text or explanation:
{{
    "recipe_name": "Name of the dish",
    "ingredients_required": ["ingredient 1 with quantity", "ingredient 2 with quantity"],
    "missing_ingredients": ["ingredient 1", "ingredient 2"],
    "instructions": ["Step 1", "Step 2"],
    "difficulty_level": "easy/medium/hard",
    "cooking_time": "30"
}}

Make sure all ingredient quantities are appropriate for {servings} servings."#,
        servings = servings,
        list = ingredients.join(", "),
    )
}

/// Decodes the JSON object spanning the first `{` to the last `}` of `reply`
pub fn parse_recipe_reply(reply: &str) -> Result<Map<String, Value>, SuggestionError> {
    let (Some(start), Some(end)) = (reply.find('{'), reply.rfind('}')) else {
        return Err(SuggestionError::Parse("no JSON object in reply".to_string()));
    };
    if end < start {
        return Err(SuggestionError::Parse("no JSON object in reply".to_string()));
    }

    match serde_json::from_str::<Value>(&reply[start..=end]) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(SuggestionError::Parse("reply is not a JSON object".to_string())),
        Err(e) => Err(SuggestionError::Parse(e.to_string())),
    }
}

/// Fills defaults and coerces loosely typed fields
pub fn normalize(fields: Map<String, Value>, servings: u32) -> Recipe {
    let text = |key: &str, default: &str| match fields.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => default.to_string(),
    };

    Recipe {
        recipe_name: text("recipe_name", UNNAMED_RECIPE),
        ingredients_required: string_list(fields.get("ingredients_required")),
        missing_ingredients: string_list(fields.get("missing_ingredients")),
        instructions: string_list(fields.get("instructions")),
        difficulty_level: text("difficulty_level", DEFAULT_DIFFICULTY),
        cooking_time: text("cooking_time", DEFAULT_COOKING_TIME),
        servings,
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Returned for an empty pantry
pub fn no_recipe(servings: u32) -> Recipe {
    Recipe {
        recipe_name: "No Recipe".to_string(),
        ingredients_required: Vec::new(),
        missing_ingredients: Vec::new(),
        instructions: vec!["Please add some ingredients first".to_string()],
        difficulty_level: "N/A".to_string(),
        cooking_time: "0".to_string(),
        servings,
    }
}

const MEATS: &[&str] = &[
    "chicken", "beef", "pork", "lamb", "turkey", "bacon", "sausage", "ham", "mince", "meat",
];

/// Rule-based stand-in for the generator, written for the base serving count
pub fn mock_recipe(ingredients: &[String], servings: u32) -> Recipe {
    let has = |needle: &str| {
        ingredients
            .iter()
            .find(|name| name.to_lowercase().contains(needle))
            .cloned()
    };
    let others = |skip: &str| -> Vec<String> {
        ingredients
            .iter()
            .filter(|name| name.as_str() != skip)
            .take(4)
            .cloned()
            .collect()
    };

    let egg = ingredients
        .iter()
        .find(|name| {
            let lower = name.to_lowercase();
            lower.contains("egg") && !lower.contains("eggplant")
        })
        .cloned();

    if let Some(egg) = egg {
        let mut required = vec![format!("4 {}", egg), "1 tbsp butter".to_string()];
        required.extend(others(&egg).into_iter().map(|name| format!("50 g {}", name)));

        return Recipe {
            recipe_name: "Pantry Omelette".to_string(),
            missing_ingredients: missing_staples(ingredients, &["butter"]),
            ingredients_required: required,
            instructions: vec![
                "Whisk the eggs with a pinch of salt.".to_string(),
                "Chop the remaining ingredients into small pieces.".to_string(),
                "Melt the butter in a pan over medium heat and soften the vegetables.".to_string(),
                "Pour in the eggs and cook until just set, then fold and serve.".to_string(),
            ],
            difficulty_level: "easy".to_string(),
            cooking_time: "15".to_string(),
            servings,
        };
    }

    if let Some(meat) = MEATS.iter().find_map(|m| has(*m)) {
        let mut required = vec![
            format!("300 g {}", meat),
            "2 tbsp soy sauce".to_string(),
            "1 tbsp vegetable oil".to_string(),
        ];
        required.extend(others(&meat).into_iter().map(|name| format!("1 cup {}", name)));

        return Recipe {
            recipe_name: format!("{} Stir-Fry", title_case(&meat)),
            missing_ingredients: missing_staples(ingredients, &["soy sauce", "vegetable oil"]),
            ingredients_required: required,
            instructions: vec![
                format!("Slice the {} into thin strips.", meat.to_lowercase()),
                "Heat the oil in a wok over high heat.".to_string(),
                "Stir-fry the meat until browned, then add the other ingredients.".to_string(),
                "Add the soy sauce, toss for two minutes and serve hot.".to_string(),
            ],
            difficulty_level: "medium".to_string(),
            cooking_time: "25".to_string(),
            servings,
        };
    }

    let main = ingredients.first().cloned().unwrap_or_default();
    let mut required: Vec<String> = ingredients
        .iter()
        .take(5)
        .map(|name| format!("1 cup {}", name))
        .collect();
    required.push("1 tbsp olive oil".to_string());

    Recipe {
        recipe_name: format!("Simple {} Sauté", title_case(&main)),
        missing_ingredients: missing_staples(ingredients, &["olive oil"]),
        ingredients_required: required,
        instructions: vec![
            "Chop all ingredients into bite-sized pieces.".to_string(),
            "Warm the olive oil in a pan over medium heat.".to_string(),
            "Sauté the firmest ingredients first, adding the rest as they soften.".to_string(),
            "Season with salt and pepper and serve.".to_string(),
        ],
        difficulty_level: "easy".to_string(),
        cooking_time: "20".to_string(),
        servings,
    }
}

fn missing_staples(ingredients: &[String], staples: &[&str]) -> Vec<String> {
    staples
        .iter()
        .filter(|staple| {
            !ingredients
                .iter()
                .any(|name| name.to_lowercase().contains(**staple))
        })
        .map(|staple| staple.to_string())
        .collect()
}

fn title_case(name: &str) -> String {
    let mut chars = name.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
