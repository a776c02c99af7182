// src/ingredients/services.rs
//! Owner-scoped pantry storage

use std::collections::HashSet;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, error, info, warn};

use super::models::{
    CreateIngredientRequest, Ingredient, LocalIngredient, Persisted, SyncOutcome,
    UpdateIngredientRequest, DEFAULT_UNIT,
};
use super::validators::IngredientValidator;
use crate::common::{
    generate_ingredient_id, ingredient_name_key, is_unique_violation, ApiError, Validator,
};

const SELECT_INGREDIENT: &str =
    "SELECT id, owner_id, name, quantity, unit, created_at, updated_at FROM ingredients";

pub struct IngredientsService {
    db: SqlitePool,
}

impl IngredientsService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// All ingredients of `owner_id`, sorted by name (case-insensitive)
    pub async fn list(&self, owner_id: &str) -> Result<Vec<Ingredient>, ApiError> {
        let ingredients = sqlx::query_as::<_, Ingredient>(&format!(
            "{} WHERE owner_id = ? ORDER BY name_key ASC, name ASC",
            SELECT_INGREDIENT
        ))
        .bind(owner_id)
        .fetch_all(&self.db)
        .await
        .map_err(|e| {
            error!(error = %e, owner_id = %owner_id, "Database error listing ingredients");
            ApiError::StoreUnavailable(e)
        })?;

        debug!(
            owner_id = %owner_id,
            ingredient_count = ingredients.len(),
            "Fetched ingredients"
        );

        Ok(ingredients)
    }

    /// Ingredient names only, for prompt building
    pub async fn names(&self, owner_id: &str) -> Result<Vec<String>, ApiError> {
        Ok(self
            .list(owner_id)
            .await?
            .into_iter()
            .map(|i| i.name)
            .collect())
    }

    pub async fn get(&self, owner_id: &str, ingredient_id: &str) -> Result<Ingredient, ApiError> {
        sqlx::query_as::<_, Ingredient>(&format!(
            "{} WHERE id = ? AND owner_id = ?",
            SELECT_INGREDIENT
        ))
        .bind(ingredient_id)
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Ingredient not found".to_string()))
    }

    /// Creates an ingredient.
    ///
    /// Duplicate names are a `Conflict`. Any other store failure still
    /// returns the built record, tagged as not persisted.
    pub async fn create(
        &self,
        owner_id: &str,
        request: CreateIngredientRequest,
    ) -> Result<Persisted<Ingredient>, ApiError> {
        IngredientValidator.validate(&request).into_result()?;

        let now = Utc::now().to_rfc3339();
        let ingredient = Ingredient {
            id: generate_ingredient_id(),
            owner_id: owner_id.to_string(),
            name: request.name.trim().to_string(),
            quantity: request.quantity,
            unit: request.unit.trim().to_string(),
            created_at: now.clone(),
            updated_at: now,
        };

        match self.insert(&ingredient, false).await {
            Ok(_) => {
                info!(
                    owner_id = %owner_id,
                    ingredient_id = %ingredient.id,
                    name = %ingredient.name,
                    "Ingredient created"
                );
                Ok(Persisted::stored(ingredient))
            }
            Err(e) if is_unique_violation(&e) => {
                warn!(owner_id = %owner_id, name = %ingredient.name, "Duplicate ingredient name");
                Err(ApiError::Conflict(format!(
                    "Ingredient '{}' already exists",
                    ingredient.name
                )))
            }
            Err(e) => {
                error!(
                    error = %e,
                    owner_id = %owner_id,
                    ingredient_id = %ingredient.id,
                    "Ingredient insert failed, returning unsaved record"
                );
                Ok(Persisted::degraded(
                    ingredient,
                    format!("ingredient was not saved: {}", e),
                ))
            }
        }
    }

    /// Applies only the supplied fields. Ownership never changes here.
    pub async fn update(
        &self,
        owner_id: &str,
        ingredient_id: &str,
        request: UpdateIngredientRequest,
    ) -> Result<Ingredient, ApiError> {
        IngredientValidator.validate(&request).into_result()?;

        let result = sqlx::query(
            r#"
            UPDATE ingredients
            SET name = COALESCE(?, name),
                name_key = COALESCE(?, name_key),
                quantity = COALESCE(?, quantity),
                unit = COALESCE(?, unit),
                updated_at = ?
            WHERE id = ? AND owner_id = ?
            "#,
        )
        .bind(request.name.as_deref().map(str::trim))
        .bind(request.name.as_deref().map(ingredient_name_key))
        .bind(request.quantity)
        .bind(request.unit.as_deref().map(str::trim))
        .bind(Utc::now().to_rfc3339())
        .bind(ingredient_id)
        .bind(owner_id)
        .execute(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::Conflict("An ingredient with that name already exists".to_string())
            } else {
                error!(
                    error = %e,
                    owner_id = %owner_id,
                    ingredient_id = %ingredient_id,
                    "Database error updating ingredient"
                );
                ApiError::StoreUnavailable(e)
            }
        })?;

        if result.rows_affected() == 0 {
            warn!(
                owner_id = %owner_id,
                ingredient_id = %ingredient_id,
                "Ingredient not found or owned by someone else"
            );
            return Err(ApiError::NotFound("Ingredient not found".to_string()));
        }

        self.get(owner_id, ingredient_id).await
    }

    pub async fn delete(&self, owner_id: &str, ingredient_id: &str) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM ingredients WHERE id = ? AND owner_id = ?")
            .bind(ingredient_id)
            .bind(owner_id)
            .execute(&self.db)
            .await
            .map_err(|e| {
                error!(
                    error = %e,
                    owner_id = %owner_id,
                    ingredient_id = %ingredient_id,
                    "Database error deleting ingredient"
                );
                ApiError::StoreUnavailable(e)
            })?;

        if result.rows_affected() == 0 {
            warn!(
                owner_id = %owner_id,
                ingredient_id = %ingredient_id,
                "Ingredient not found or owned by someone else, nothing deleted"
            );
            return Err(ApiError::NotFound("Ingredient not found".to_string()));
        }

        info!(owner_id = %owner_id, ingredient_id = %ingredient_id, "Ingredient deleted");
        Ok(())
    }

    /// Merges a locally cached batch into the owner's pantry.
    ///
    /// Names already owned (or repeated in the batch) are skipped,
    /// case-insensitively. Invalid entries are skipped without failing the
    /// batch. Returns the full collection after the merge.
    pub async fn sync(
        &self,
        owner_id: &str,
        items: Vec<LocalIngredient>,
    ) -> Result<SyncOutcome, ApiError> {
        let mut known: HashSet<String> = self
            .names(owner_id)
            .await?
            .into_iter()
            .map(|n| ingredient_name_key(&n))
            .collect();

        let mut inserted = 0;
        let mut skipped = 0;

        for item in items {
            let Some(request) = local_to_request(item) else {
                skipped += 1;
                continue;
            };

            if !IngredientValidator.validate(&request).is_valid {
                debug!(owner_id = %owner_id, name = %request.name, "Skipping invalid local ingredient");
                skipped += 1;
                continue;
            }

            let key = ingredient_name_key(&request.name);
            if known.contains(&key) {
                skipped += 1;
                continue;
            }

            let now = Utc::now().to_rfc3339();
            let ingredient = Ingredient {
                id: generate_ingredient_id(),
                owner_id: owner_id.to_string(),
                name: request.name.trim().to_string(),
                quantity: request.quantity,
                unit: request.unit.trim().to_string(),
                created_at: now.clone(),
                updated_at: now,
            };

            match self.insert(&ingredient, true).await {
                Ok(1) => {
                    inserted += 1;
                    known.insert(key);
                }
                Ok(_) => {
                    // lost a race with a concurrent insert of the same name
                    skipped += 1;
                    known.insert(key);
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        owner_id = %owner_id,
                        name = %ingredient.name,
                        "Failed to insert synced ingredient, skipping"
                    );
                    skipped += 1;
                }
            }
        }

        let ingredients = self.list(owner_id).await?;

        info!(
            owner_id = %owner_id,
            inserted = inserted,
            skipped = skipped,
            total = ingredients.len(),
            "Ingredient sync completed"
        );

        Ok(SyncOutcome {
            ingredients,
            inserted,
            skipped,
        })
    }

    /// Inserts `items` only when the owner has no ingredients at all.
    /// Returns how many rows were written.
    pub async fn seed_if_empty(
        &self,
        owner_id: &str,
        items: &[(&str, f64, &str)],
    ) -> Result<usize, ApiError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM ingredients WHERE owner_id = ?")
                .bind(owner_id)
                .fetch_one(&self.db)
                .await?;

        if count > 0 {
            return Ok(0);
        }

        let mut written = 0;
        for (name, quantity, unit) in items {
            let now = Utc::now().to_rfc3339();
            let ingredient = Ingredient {
                id: generate_ingredient_id(),
                owner_id: owner_id.to_string(),
                name: name.to_string(),
                quantity: *quantity,
                unit: unit.to_string(),
                created_at: now.clone(),
                updated_at: now,
            };
            written += self.insert(&ingredient, true).await? as usize;
        }

        Ok(written)
    }

    async fn insert(&self, ingredient: &Ingredient, ignore_conflicts: bool) -> Result<u64, sqlx::Error> {
        let sql = if ignore_conflicts {
            r#"
            INSERT INTO ingredients (id, owner_id, name, name_key, quantity, unit, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT DO NOTHING
            "#
        } else {
            r#"
            INSERT INTO ingredients (id, owner_id, name, name_key, quantity, unit, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#
        };

        let result = sqlx::query(sql)
            .bind(&ingredient.id)
            .bind(&ingredient.owner_id)
            .bind(&ingredient.name)
            .bind(ingredient_name_key(&ingredient.name))
            .bind(ingredient.quantity)
            .bind(&ingredient.unit)
            .bind(&ingredient.created_at)
            .bind(&ingredient.updated_at)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected())
    }
}

fn local_to_request(item: LocalIngredient) -> Option<CreateIngredientRequest> {
    let name = item.name?.trim().to_string();
    if name.is_empty() {
        return None;
    }

    Some(CreateIngredientRequest {
        name,
        quantity: item.quantity.unwrap_or(1.0),
        unit: item
            .unit
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_UNIT.to_string()),
    })
}
