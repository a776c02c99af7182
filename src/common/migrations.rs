// src/common/migrations.rs
//! Database schema management

use sqlx::SqlitePool;
use std::env;

use super::helpers::ingredient_name_key;
use tracing::{info, warn};

/// Run all database migrations
///
/// Tables are created if they don't exist. Set `RESET_DB=true` to drop and
/// recreate everything.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let should_reset_db = env::var("RESET_DB").unwrap_or_else(|_| "false".to_string()) == "true";

    if should_reset_db {
        warn!("⚠️  RESET_DB=true - Dropping all tables and recreating schema...");
        drop_all_tables(pool).await?;
        info!("✅ Dropped old tables");
    }

    create_schema(pool).await?;

    info!("✅ Database migration completed successfully!");

    Ok(())
}

/// Create every table and index. Idempotent.
pub async fn create_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    create_user_tables(pool).await?;
    create_pantry_tables(pool).await?;
    create_recipe_tables(pool).await?;
    create_indexes(pool).await?;
    Ok(())
}

async fn drop_all_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // children first
    for table in ["saved_recipes", "ingredients", "users"] {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(pool)
            .await?;
    }
    Ok(())
}

async fn create_user_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // external_provider_id is UNIQUE so lazy creation can upsert instead of
    // check-then-insert
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL,
            name TEXT NOT NULL,
            picture TEXT,
            external_provider_id TEXT UNIQUE,
            is_active BOOLEAN NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_pantry_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ingredients (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL CHECK (length(trim(name)) > 0),
            name_key TEXT NOT NULL,
            quantity REAL NOT NULL DEFAULT 1.0 CHECK (quantity > 0),
            unit TEXT NOT NULL DEFAULT 'pieces',
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Add name_key to databases created before it existed (ignore error if column already exists)
    let _ = sqlx::query("ALTER TABLE ingredients ADD COLUMN name_key TEXT")
        .execute(pool)
        .await;
    backfill_name_keys(pool).await?;

    Ok(())
}

/// SQLite's `lower()` only folds ASCII, so keys are computed here
async fn backfill_name_keys(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT id, name FROM ingredients WHERE name_key IS NULL")
            .fetch_all(pool)
            .await?;

    for (id, name) in &rows {
        sqlx::query("UPDATE ingredients SET name_key = ? WHERE id = ?")
            .bind(ingredient_name_key(name))
            .bind(id)
            .execute(pool)
            .await?;
    }

    if !rows.is_empty() {
        info!(count = rows.len(), "Backfilled ingredient name keys");
    }
    Ok(())
}

async fn create_recipe_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // List columns hold JSON arrays of strings
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS saved_recipes (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            recipe_name TEXT NOT NULL,
            ingredients_required TEXT NOT NULL DEFAULT '[]',
            missing_ingredients TEXT NOT NULL DEFAULT '[]',
            instructions TEXT NOT NULL DEFAULT '[]',
            difficulty_level TEXT NOT NULL DEFAULT 'medium',
            cooking_time TEXT NOT NULL DEFAULT '30',
            servings INTEGER NOT NULL DEFAULT 2 CHECK (servings > 0),
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let statements = [
        // superseded by the name_key index
        "DROP INDEX IF EXISTS idx_ingredients_owner_name",
        // per-owner, case-insensitive ingredient names
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_ingredients_owner_name_key ON ingredients(owner_id, name_key)",
        "CREATE INDEX IF NOT EXISTS idx_saved_recipes_owner ON saved_recipes(owner_id, created_at)",
        "CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)",
    ];

    for statement in statements {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}
