//! Shared test utilities for database operations
//!
//! Every unit test gets its own in-memory database with the documents
//! table already created.

use sqlx::SqlitePool;

use super::Database;
use crate::store::Repositories;

/// Create an in-memory test database pool with full schema
pub async fn test_pool() -> SqlitePool {
    let db = Database::new(None)
        .await
        .expect("Failed to create test database");
    db.pool().clone()
}

/// Repositories over a fresh in-memory database
pub async fn test_repos() -> Repositories {
    Repositories::sqlite(test_pool().await)
}
