//! Tests for recipes module
//!
//! Covers reply parsing and normalization, the suggestion flow against a
//! scripted generator, and saved recipe storage.

#[cfg(test)]
mod tests {
    use super::super::models::*;
    use super::super::services::SavedRecipesService;
    use super::super::suggestions::*;
    use super::super::validators::suggest_servings;
    use crate::common::test_support::{insert_user, test_pool};
    use crate::common::ApiError;
    use crate::ingredients::models::CreateIngredientRequest;
    use crate::ingredients::IngredientsService;
    use crate::services::{GenerationError, TextGenerator};
    use async_trait::async_trait;
    use serde_json::json;
    use sqlx::SqlitePool;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Generator returning a fixed reply and counting calls
    struct ScriptedGenerator {
        reply: Result<String, fn() -> GenerationError>,
        calls: AtomicUsize,
        last_prompt: Mutex<Option<String>>,
    }

    impl ScriptedGenerator {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
            })
        }

        fn failing(error: fn() -> GenerationError) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(error),
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, _system_prompt: &str, prompt: &str) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    async fn pantry(pool: &SqlitePool, owner: &str, names: &[&str]) {
        let service = IngredientsService::new(pool.clone());
        for name in names {
            service
                .create(
                    owner,
                    CreateIngredientRequest {
                        name: name.to_string(),
                        quantity: 1.0,
                        unit: "pieces".to_string(),
                    },
                )
                .await
                .unwrap();
        }
    }

    fn suggester(pool: &SqlitePool, generator: Arc<ScriptedGenerator>) -> RecipeSuggester {
        RecipeSuggester::new(pool.clone(), Some(generator as Arc<dyn TextGenerator>), false)
    }

    const SOUP_REPLY: &str = r#"Sure! Here is your recipe:
{
  "recipe_name": "Tomato Soup",
  "ingredients_required": ["4 tomatoes", "1.5 cups stock", "1 onion"],
  "missing_ingredients": ["stock"],
  "instructions": ["Chop", "Simmer", "Blend"],
  "difficulty_level": "easy",
  "cooking_time": 25
}
Enjoy!"#;

    // ============================================================================
    // Parsing & Normalization
    // ============================================================================

    #[test]
    fn test_parse_reply_without_braces_is_parse_error() {
        let err = parse_recipe_reply("I cannot help with that.").unwrap_err();
        assert!(matches!(err, SuggestionError::Parse(_)));

        let err = parse_recipe_reply("} backwards {").unwrap_err();
        assert!(matches!(err, SuggestionError::Parse(_)));

        let err = parse_recipe_reply("{ not json }").unwrap_err();
        assert!(matches!(err, SuggestionError::Parse(_)));
    }

    #[test]
    fn test_parse_reply_tolerates_surrounding_prose() {
        let fields = parse_recipe_reply(SOUP_REPLY).unwrap();
        assert_eq!(fields["recipe_name"], "Tomato Soup");
    }

    #[test]
    fn test_normalize_fills_defaults_and_coerces() {
        let fields = json!({
            "ingredients_required": "2 eggs",
            "instructions": ["Boil", null, 3],
            "cooking_time": 12,
        });
        let recipe = normalize(fields.as_object().unwrap().clone(), 3);

        assert_eq!(recipe.recipe_name, "Unnamed Recipe");
        assert!(recipe.ingredients_required.is_empty());
        assert!(recipe.missing_ingredients.is_empty());
        assert_eq!(recipe.instructions, vec!["Boil".to_string(), "3".to_string()]);
        assert_eq!(recipe.difficulty_level, "medium");
        assert_eq!(recipe.cooking_time, "12");
        assert_eq!(recipe.servings, 3);
    }

    #[test]
    fn test_prompt_names_ingredients_and_servings() {
        let prompt = build_prompt(&["Tomato".to_string(), "Basil".to_string()], 4);
        assert!(prompt.contains("Tomato, Basil"));
        assert!(prompt.contains("for 4 servings"));
        assert!(prompt.contains("\"missing_ingredients\""));
    }

    #[test]
    fn test_suggest_servings_bounds() {
        assert_eq!(suggest_servings(None).unwrap(), 2);
        assert_eq!(suggest_servings(Some(10)).unwrap(), 10);
        assert!(matches!(suggest_servings(Some(0)), Err(ApiError::ValidationError(_))));
        assert!(matches!(suggest_servings(Some(11)), Err(ApiError::ValidationError(_))));
    }

    #[test]
    fn test_mock_recipe_rules() {
        let names = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        let omelette = mock_recipe(&names(&["Eggs", "Spinach"]), 2);
        assert!(omelette.recipe_name.contains("Omelette"));
        assert_eq!(omelette.missing_ingredients, vec!["butter".to_string()]);

        let stir_fry = mock_recipe(&names(&["Rice", "Chicken breast"]), 2);
        assert_eq!(stir_fry.recipe_name, "Chicken breast Stir-Fry");

        let saute = mock_recipe(&names(&["eggplant", "Olive oil"]), 2);
        assert_eq!(saute.recipe_name, "Simple Eggplant Sauté");
        assert!(saute.missing_ingredients.is_empty());
    }

    // ============================================================================
    // Suggestion flow
    // ============================================================================

    #[tokio::test]
    async fn test_empty_pantry_skips_generator() {
        let pool = test_pool().await;
        let owner = insert_user(&pool, "owner-a").await;
        let generator = ScriptedGenerator::replying(SOUP_REPLY);

        let recipe = suggester(&pool, generator.clone()).suggest(&owner, 4).await.unwrap();

        assert_eq!(recipe, no_recipe(4));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_suggest_scales_generated_quantities() {
        let pool = test_pool().await;
        let owner = insert_user(&pool, "owner-a").await;
        pantry(&pool, &owner, &["Tomato", "Onion"]).await;
        let generator = ScriptedGenerator::replying(SOUP_REPLY);

        let recipe = suggester(&pool, generator.clone()).suggest(&owner, 4).await.unwrap();

        assert_eq!(generator.calls(), 1);
        assert_eq!(recipe.recipe_name, "Tomato Soup");
        assert_eq!(recipe.servings, 4);
        assert_eq!(recipe.cooking_time, "25");
        assert_eq!(
            recipe.ingredients_required,
            vec![
                "8 tomatoes".to_string(),
                "3.0 cups stock".to_string(),
                "2 onion".to_string()
            ]
        );

        let prompt = generator.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("Onion, Tomato"));
    }

    #[tokio::test]
    async fn test_malformed_reply_is_reported() {
        let pool = test_pool().await;
        let owner = insert_user(&pool, "owner-a").await;
        pantry(&pool, &owner, &["Tomato"]).await;

        let err = suggester(&pool, ScriptedGenerator::replying("no json here"))
            .suggest(&owner, 2)
            .await
            .unwrap_err();
        match err {
            ApiError::UpstreamUnavailable(msg) => assert!(msg.contains("parse")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generation_failure_is_reported() {
        let pool = test_pool().await;
        let owner = insert_user(&pool, "owner-a").await;
        pantry(&pool, &owner, &["Tomato"]).await;

        let err = suggester(&pool, ScriptedGenerator::failing(|| GenerationError::RateLimited))
            .suggest(&owner, 2)
            .await
            .unwrap_err();
        match err {
            ApiError::UpstreamUnavailable(msg) => assert!(msg.contains("Too many requests")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_generator_uses_mock_or_fails() {
        let pool = test_pool().await;
        let owner = insert_user(&pool, "owner-a").await;
        pantry(&pool, &owner, &["Eggs", "Cheese"]).await;

        let recipe = RecipeSuggester::new(pool.clone(), None, true)
            .suggest(&owner, 4)
            .await
            .unwrap();
        assert!(recipe.recipe_name.contains("Omelette"));
        assert_eq!(recipe.ingredients_required[0], "8 Eggs");
        assert_eq!(recipe.servings, 4);

        let err = RecipeSuggester::new(pool, None, false)
            .suggest(&owner, 4)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn test_suggest_reads_only_callers_pantry() {
        let pool = test_pool().await;
        let owner_a = insert_user(&pool, "owner-a").await;
        let owner_b = insert_user(&pool, "owner-b").await;
        pantry(&pool, &owner_b, &["Truffle"]).await;
        let generator = ScriptedGenerator::replying(SOUP_REPLY);

        let recipe = suggester(&pool, generator.clone()).suggest(&owner_a, 2).await.unwrap();
        assert_eq!(recipe.recipe_name, "No Recipe");
        assert_eq!(generator.calls(), 0);
    }

    // ============================================================================
    // Saved recipes
    // ============================================================================

    fn saved_request(name: &str) -> CreateSavedRecipeRequest {
        CreateSavedRecipeRequest {
            recipe_name: name.to_string(),
            ingredients_required: vec!["2 eggs".to_string()],
            instructions: vec!["Cook".to_string()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_saved_recipe_applies_defaults() {
        let pool = test_pool().await;
        let owner = insert_user(&pool, "owner-a").await;
        let service = SavedRecipesService::new(pool);

        let saved = service.create(&owner, saved_request("Eggs")).await.unwrap();
        assert!(saved.id.starts_with("R_"));
        assert_eq!(saved.difficulty_level, "medium");
        assert_eq!(saved.cooking_time, "30");
        assert_eq!(saved.servings, 2);

        let fetched = service.get(&owner, &saved.id).await.unwrap();
        assert_eq!(fetched, saved);
    }

    #[tokio::test]
    async fn test_create_saved_recipe_requires_content() {
        let pool = test_pool().await;
        let owner = insert_user(&pool, "owner-a").await;
        let service = SavedRecipesService::new(pool);

        let err = service
            .create(&owner, CreateSavedRecipeRequest {
                recipe_name: "Empty".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        match err {
            ApiError::ValidationError(msg) => {
                assert!(msg.contains("ingredients_required"));
                assert!(msg.contains("instructions"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_saved_recipes_newest_first_with_paging() {
        let pool = test_pool().await;
        let owner = insert_user(&pool, "owner-a").await;
        let service = SavedRecipesService::new(pool);

        for name in ["First", "Second", "Third"] {
            service.create(&owner, saved_request(name)).await.unwrap();
        }

        let names: Vec<String> = service
            .list(&owner, None, None)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.recipe_name)
            .collect();
        assert_eq!(names, vec!["Third", "Second", "First"]);

        let page = service.list(&owner, Some(1), Some(1)).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].recipe_name, "Second");

        // limit 0 is clamped up to 1
        assert_eq!(service.list(&owner, None, Some(0)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_list_column_does_not_break_listing() {
        let pool = test_pool().await;
        let owner = insert_user(&pool, "owner-a").await;
        let service = SavedRecipesService::new(pool.clone());

        let broken = service.create(&owner, saved_request("Broken")).await.unwrap();
        service.create(&owner, saved_request("Fine")).await.unwrap();

        sqlx::query("UPDATE saved_recipes SET instructions = 'not json', missing_ingredients = '{\"a\":1}' WHERE id = ?")
            .bind(&broken.id)
            .execute(&pool)
            .await
            .unwrap();

        let listed = service.list(&owner, None, None).await.unwrap();
        assert_eq!(listed.len(), 2);

        let broken = listed.iter().find(|r| r.recipe_name == "Broken").unwrap();
        assert!(broken.instructions.is_empty());
        assert!(broken.missing_ingredients.is_empty());
        assert_eq!(broken.ingredients_required, vec!["2 eggs".to_string()]);
    }

    #[tokio::test]
    async fn test_saved_recipes_are_owner_scoped() {
        let pool = test_pool().await;
        let owner_a = insert_user(&pool, "owner-a").await;
        let owner_b = insert_user(&pool, "owner-b").await;
        let service = SavedRecipesService::new(pool);

        let b_recipe = service.create(&owner_b, saved_request("Secret")).await.unwrap();

        assert!(service.list(&owner_a, None, None).await.unwrap().is_empty());
        assert!(matches!(
            service.get(&owner_a, &b_recipe.id).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            service.delete(&owner_a, &b_recipe.id).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            service
                .update(&owner_a, &b_recipe.id, UpdateSavedRecipeRequest {
                    notes: Some("mine now".to_string()),
                    ..Default::default()
                })
                .await,
            Err(ApiError::NotFound(_))
        ));

        assert!(service.get(&owner_b, &b_recipe.id).await.unwrap().notes.is_none());
    }

    #[tokio::test]
    async fn test_update_saved_recipe_changes_only_supplied_fields() {
        let pool = test_pool().await;
        let owner = insert_user(&pool, "owner-a").await;
        let service = SavedRecipesService::new(pool);

        let saved = service.create(&owner, saved_request("Eggs")).await.unwrap();
        let updated = service
            .update(&owner, &saved.id, UpdateSavedRecipeRequest {
                servings: Some(6),
                instructions: Some(vec!["Whisk".to_string(), "Fry".to_string()]),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.servings, 6);
        assert_eq!(updated.instructions.len(), 2);
        assert_eq!(updated.recipe_name, "Eggs");
        assert_eq!(updated.ingredients_required, saved.ingredients_required);

        let err = service
            .update(&owner, &saved.id, UpdateSavedRecipeRequest {
                instructions: Some(Vec::new()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
    }
}
