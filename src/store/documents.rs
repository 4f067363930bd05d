//! Keyed JSON document persistence

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{Sqlite, SqlitePool, Transaction};

/// Scope for documents that belong to no campaign
pub const GLOBAL_SCOPE: &str = "global";

/// Document storage with database backing
#[derive(Clone)]
pub struct DocumentStore {
    pool: SqlitePool,
}

impl DocumentStore {
    /// Create a new document store with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Read and decode a document
    pub async fn get<T: DeserializeOwned>(&self, scope: &str, key: &str) -> Result<Option<T>> {
        let body = fetch_body(&self.pool, scope, key).await?;
        body.map(|b| decode(scope, key, &b)).transpose()
    }

    /// Insert or replace a document
    pub async fn put<T: Serialize + ?Sized>(&self, scope: &str, key: &str, value: &T) -> Result<()> {
        let body = serde_json::to_string(value)?;
        upsert_body(&self.pool, scope, key, &body).await
    }

    /// Delete a document, returning whether it existed
    pub async fn delete(&self, scope: &str, key: &str) -> Result<bool> {
        delete_body(&self.pool, scope, key).await
    }

    /// Start a transaction for multi-document writes
    pub async fn begin(&self) -> Result<DocumentTxn> {
        Ok(DocumentTxn {
            tx: self.pool.begin().await?,
        })
    }
}

/// A set of document reads and writes that commit together
pub struct DocumentTxn {
    tx: Transaction<'static, Sqlite>,
}

impl DocumentTxn {
    /// Read and decode a document inside the transaction
    pub async fn get<T: DeserializeOwned>(&mut self, scope: &str, key: &str) -> Result<Option<T>> {
        let body = fetch_body(&mut *self.tx, scope, key).await?;
        body.map(|b| decode(scope, key, &b)).transpose()
    }

    /// Insert or replace a document inside the transaction
    pub async fn put<T: Serialize + ?Sized>(
        &mut self,
        scope: &str,
        key: &str,
        value: &T,
    ) -> Result<()> {
        let body = serde_json::to_string(value)?;
        upsert_body(&mut *self.tx, scope, key, &body).await
    }

    /// Delete a document inside the transaction
    pub async fn delete(&mut self, scope: &str, key: &str) -> Result<bool> {
        delete_body(&mut *self.tx, scope, key).await
    }

    /// Delete every document of a scope
    pub async fn delete_scope(&mut self, scope: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM documents WHERE scope = ?")
            .bind(scope)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    /// Commit all writes
    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

async fn fetch_body<'e, E>(executor: E, scope: &str, key: &str) -> Result<Option<String>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row: Option<(String,)> =
        sqlx::query_as("SELECT body FROM documents WHERE scope = ? AND doc_key = ?")
            .bind(scope)
            .bind(key)
            .fetch_optional(executor)
            .await?;

    Ok(row.map(|(b,)| b))
}

async fn upsert_body<'e, E>(executor: E, scope: &str, key: &str, body: &str) -> Result<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let updated_at = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO documents (scope, doc_key, body, updated_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(scope, doc_key) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at
        "#,
    )
    .bind(scope)
    .bind(key)
    .bind(body)
    .bind(&updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

async fn delete_body<'e, E>(executor: E, scope: &str, key: &str) -> Result<bool>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM documents WHERE scope = ? AND doc_key = ?")
        .bind(scope)
        .bind(key)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

fn decode<T: DeserializeOwned>(scope: &str, key: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).with_context(|| format!("corrupt document {}/{}", scope, key))
}
