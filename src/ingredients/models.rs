// src/ingredients/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const DEFAULT_UNIT: &str = "pieces";

fn default_quantity() -> f64 {
    1.0
}

fn default_unit() -> String {
    DEFAULT_UNIT.to_string()
}

// ============================================================================
// Pantry Models
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Ingredient {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateIngredientRequest {
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    #[serde(default = "default_unit")]
    pub unit: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateIngredientRequest {
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
}

/// One entry of a client-side (anonymous session) ingredient cache.
/// Fields are loose on purpose: bad entries are skipped, not rejected.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalIngredient {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SyncIngredientsRequest {
    #[serde(alias = "ingredients")]
    pub items: Vec<LocalIngredient>,
}

#[derive(Debug, Serialize)]
pub struct SyncOutcome {
    /// The owner's full collection after the sync
    pub ingredients: Vec<Ingredient>,
    pub inserted: usize,
    pub skipped: usize,
}

/// A write that may only have happened in memory.
///
/// `persisted == false` means the record was built but the store rejected
/// the write for a reason other than validation; `detail` says why.
#[derive(Debug, Serialize)]
pub struct Persisted<T> {
    pub record: T,
    pub persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl<T> Persisted<T> {
    pub fn stored(record: T) -> Self {
        Self {
            record,
            persisted: true,
            detail: None,
        }
    }

    pub fn degraded(record: T, detail: impl Into<String>) -> Self {
        Self {
            record,
            persisted: false,
            detail: Some(detail.into()),
        }
    }
}
