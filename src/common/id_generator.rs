// src/common/id_generator.rs
//! Identifier generation
//!
//! Users are keyed by UUIDs so that bearer identities can be validated
//! syntactically. Ingredients and saved recipes use short prefixed
//! Crockford Base32 ids: `PREFIX_XXXXXXXX` (e.g. `G_K7NP3X2M`).

use rand::Rng;
use uuid::Uuid;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

const RANDOM_PART_LEN: usize = 8;

/// Entity type prefixes for ID generation
#[derive(Debug, Clone, Copy)]
pub enum EntityPrefix {
    /// Pantry ingredient (G_) - G for Grocery
    Ingredient,
    /// Saved recipe (R_)
    SavedRecipe,
}

impl EntityPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Ingredient => "G",
            EntityPrefix::SavedRecipe => "R",
        }
    }
}

fn generate_crockford_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..32);
            CROCKFORD_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a prefixed ID, e.g. "G_K7NP3X2M"
pub fn generate_id(prefix: EntityPrefix) -> String {
    format!("{}_{}", prefix.as_str(), generate_crockford_string(RANDOM_PART_LEN))
}

pub fn generate_ingredient_id() -> String {
    generate_id(EntityPrefix::Ingredient)
}

pub fn generate_saved_recipe_id() -> String {
    generate_id(EntityPrefix::SavedRecipe)
}

/// Generate a fresh user id (random UUID, hyphenated lowercase)
pub fn generate_user_id() -> String {
    Uuid::new_v4().to_string()
}

/// Normalizes a user id claim, returning None unless it is a UUID
pub fn parse_user_id(raw: &str) -> Option<String> {
    Uuid::parse_str(raw.trim()).ok().map(|u| u.to_string())
}
