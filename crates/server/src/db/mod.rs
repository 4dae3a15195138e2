//! Document store access.
//!
//! Customers live in a document store that only offers three operations:
//! scan a whole collection, get one document by ID, and set one document by
//! ID. There is no server-side filtering, sorting or pagination.
//!
//! # Backends
//!
//! - [`PgDocumentStore`] - `PostgreSQL` table of JSONB documents
//! - [`MemoryDocumentStore`] - in-process map, used when no database is
//!   configured and in tests
//!
//! Both return documents ordered by the byte value of their ID.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p crm-cli -- migrate
//! ```

pub mod customers;
pub mod memory;
pub mod postgres;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use customers::CustomerRepository;
pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

use crate::config::StoreConfig;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// A record could not be serialized for storage.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A stored document and the ID it is filed under.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub body: Value,
}

/// A slice of a collection plus the collection size.
#[derive(Debug, Clone, Default)]
pub struct Window {
    pub documents: Vec<Document>,
    pub total: usize,
}

/// A collection-oriented document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch up to `limit` documents of `collection`, ordered by ID.
    async fn list_all(&self, collection: &str, limit: usize) -> Result<Vec<Document>, StoreError>;

    /// Fetch one document.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Create or replace one document.
    async fn set(&self, collection: &str, id: &str, body: Value) -> Result<(), StoreError>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Fetch the documents in `[offset, offset + limit)`.
    ///
    /// The default scans up to `cap` documents and slices in memory. The
    /// whole collection is read on every call; backends with native cursors
    /// can override this without callers noticing.
    async fn list_window(
        &self,
        collection: &str,
        offset: usize,
        limit: usize,
        cap: usize,
    ) -> Result<Window, StoreError> {
        let all = self.list_all(collection, cap).await?;
        let total = all.len();
        let documents = all.into_iter().skip(offset).take(limit).collect();
        Ok(Window { documents, total })
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Run the bundled migrations against `pool`.
///
/// # Errors
///
/// Returns `StoreError::Migration` if a migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Open the configured document store.
///
/// Uses `PostgreSQL` when a database URL is configured, otherwise an empty
/// in-memory store.
///
/// # Errors
///
/// Returns `StoreError::Database` if the database cannot be reached.
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>, StoreError> {
    match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            tracing::info!("Database pool created");
            Ok(Arc::new(PgDocumentStore::new(pool)))
        }
        None => {
            tracing::warn!("No database configured; customers are kept in memory only");
            Ok(Arc::new(MemoryDocumentStore::new()))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_default_list_window_slices_and_counts() {
        let store = MemoryDocumentStore::new();
        for i in 0..7 {
            store
                .set("things", &format!("id-{i}"), json!({ "n": i }))
                .await
                .unwrap();
        }

        let window = store.list_window("things", 5, 5, 100).await.unwrap();

        assert_eq!(window.total, 7);
        let ids: Vec<_> = window.documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["id-5", "id-6"]);
    }

    #[tokio::test]
    async fn test_list_window_respects_cap() {
        let store = MemoryDocumentStore::new();
        for i in 0..5 {
            store.set("things", &format!("id-{i}"), json!({})).await.unwrap();
        }

        let window = store.list_window("things", 0, 10, 3).await.unwrap();

        assert_eq!(window.total, 3);
        assert_eq!(window.documents.len(), 3);
    }

    #[tokio::test]
    async fn test_connect_without_url_uses_memory_store() {
        let store = connect(&StoreConfig::default()).await.unwrap();
        assert!(store.ping().await.is_ok());
        assert!(store.list_all("customers", 10).await.unwrap().is_empty());
    }
}
