//! Shared fixtures for database-backed tests

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::time::Duration;
use tempfile::TempDir;

use super::migrations::create_schema;

/// In-memory database with the full schema.
///
/// Every connection to `sqlite::memory:` is a separate database, so the pool
/// is pinned to a single connection.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    create_schema(&pool).await.unwrap();
    pool
}

/// File-backed database with several connections, for tests that need
/// statements to actually run concurrently. Keep the `TempDir` alive for
/// as long as the pool is used.
pub async fn concurrent_test_pool(connections: u32) -> (SqlitePool, TempDir) {
    let dir = TempDir::new().unwrap();
    let options = SqliteConnectOptions::new()
        .filename(dir.path().join("test.db"))
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .min_connections(connections)
        .max_connections(connections)
        .connect_with(options)
        .await
        .unwrap();

    create_schema(&pool).await.unwrap();
    (pool, dir)
}

/// Inserts a bare user row and returns its id
pub async fn insert_user(pool: &SqlitePool, id: &str) -> String {
    sqlx::query("INSERT INTO users (id, email, name) VALUES (?, ?, ?)")
        .bind(id)
        .bind(format!("{}@example.com", id))
        .bind(format!("User {}", id))
        .execute(pool)
        .await
        .unwrap();
    id.to_string()
}
