//! Document storage backends.
//!
//! The cart is persisted as a single whole document under one string key.
//! Backends only need durable get/put/delete; everything else (merging,
//! validation, notification) happens above them.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use thiserror::Error;

/// Errors from a document storage backend.
#[derive(Debug, Error)]
pub enum DocumentStoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Backend-specific failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Durable key-value byte storage, injected as a capability.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the document stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DocumentStoreError>;

    /// Replace the document stored under `key`.
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), DocumentStoreError>;

    /// Delete the document stored under `key`. Deleting a missing key is
    /// not an error.
    async fn delete(&self, key: &str) -> Result<(), DocumentStoreError>;
}

/// In-memory store for tests and ephemeral deployments.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DocumentStoreError> {
        Ok(self.entries().get(key).cloned())
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), DocumentStoreError> {
        self.entries().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), DocumentStoreError> {
        self.entries().remove(key);
        Ok(())
    }
}

/// `PostgreSQL`-backed store; one row per document key.
///
/// The `cart_documents` table is created by the storefront migrations
/// (run via `tualmi-cli migrate`).
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DocumentStoreError> {
        let row = sqlx::query("SELECT body FROM cart_documents WHERE doc_key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.try_get::<Vec<u8>, _>("body"))
            .transpose()
            .map_err(Into::into)
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), DocumentStoreError> {
        sqlx::query(
            "INSERT INTO cart_documents (doc_key, body, updated_at)
             VALUES ($1, $2, now())
             ON CONFLICT (doc_key)
             DO UPDATE SET body = EXCLUDED.body, updated_at = now()",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), DocumentStoreError> {
        sqlx::query("DELETE FROM cart_documents WHERE doc_key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
