//! Customer repository over a [`DocumentStore`].
//!
//! Maps between raw JSON documents and [`Customer`] records. The document ID
//! is authoritative: whatever `id` a stored body carries is replaced by the
//! key it is filed under.

use std::sync::Arc;

use serde_json::Value;

use crm_core::{Customer, Page, PageRequest};

use super::{Document, DocumentStore, StoreError};

/// Repository for customer documents.
#[derive(Clone)]
pub struct CustomerRepository {
    store: Arc<dyn DocumentStore>,
    collection: String,
    list_limit: usize,
}

impl std::fmt::Debug for CustomerRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomerRepository")
            .field("collection", &self.collection)
            .field("list_limit", &self.list_limit)
            .finish_non_exhaustive()
    }
}

impl CustomerRepository {
    /// Create a repository for `collection`, scanning at most `list_limit`
    /// documents per listing.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>, list_limit: usize) -> Self {
        Self {
            store,
            collection: collection.into(),
            list_limit,
        }
    }

    /// Fetch every customer (up to the retrieval cap), ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the scan fails or a document is malformed.
    pub async fn list_all(&self) -> Result<Vec<Customer>, StoreError> {
        self.store
            .list_all(&self.collection, self.list_limit)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    /// Fetch one page of customers and the collection size.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the scan fails or a document is malformed.
    pub async fn page(&self, request: PageRequest) -> Result<Page<Customer>, StoreError> {
        let window = self
            .store
            .list_window(
                &self.collection,
                request.offset(),
                request.limit(),
                self.list_limit,
            )
            .await?;

        let customers = window
            .documents
            .into_iter()
            .map(decode)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(customers, window.total, request))
    }

    /// Fetch one customer.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read fails or the document is malformed.
    pub async fn get(&self, id: &str) -> Result<Option<Customer>, StoreError> {
        self.store
            .get(&self.collection, id)
            .await?
            .map(decode)
            .transpose()
    }

    /// Create or replace a customer.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails.
    pub async fn put(&self, customer: &Customer) -> Result<(), StoreError> {
        let body = serde_json::to_value(customer)?;
        self.store
            .set(&self.collection, customer.id.as_str(), body)
            .await
    }
}

/// Decode a stored document into a customer.
fn decode(document: Document) -> Result<Customer, StoreError> {
    let Document { id, mut body } = document;

    let Value::Object(fields) = &mut body else {
        return Err(StoreError::DataCorruption(format!(
            "customer {id} is not a JSON object"
        )));
    };
    fields.insert("id".to_string(), Value::String(id.clone()));

    serde_json::from_value(body)
        .map_err(|e| StoreError::DataCorruption(format!("invalid customer {id}: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use crm_core::{CustomerId, CustomerInput};

    use super::*;
    use crate::db::MemoryDocumentStore;

    fn repository(store: Arc<MemoryDocumentStore>) -> CustomerRepository {
        CustomerRepository::new(store, "customers", 10_000)
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let repo = repository(Arc::new(MemoryDocumentStore::new()));
        let customer = Customer::new(CustomerId::generate(), &CustomerInput::default(), Utc::now());

        repo.put(&customer).await.unwrap();

        assert_eq!(repo.get(customer.id.as_str()).await.unwrap(), Some(customer));
    }

    #[tokio::test]
    async fn test_get_uses_document_key_as_id() {
        let store = Arc::new(MemoryDocumentStore::new());
        store
            .set(
                "customers",
                "real-id",
                json!({
                    "id": "stale-id",
                    "name": "Suzuki",
                    "email": "suzuki@example.com",
                    "status": "active",
                    "createdAt": "2025-06-01T00:00:00Z",
                    "updatedAt": "2025-06-01T00:00:00Z"
                }),
            )
            .await
            .unwrap();

        let customer = repository(store).get("real-id").await.unwrap().unwrap();
        assert_eq!(customer.id.as_str(), "real-id");
    }

    #[tokio::test]
    async fn test_malformed_document_is_data_corruption() {
        let store = Arc::new(MemoryDocumentStore::new());
        store.set("customers", "bad", json!(["not", "an", "object"])).await.unwrap();

        let result = repository(store).get("bad").await;
        assert!(matches!(result, Err(StoreError::DataCorruption(_))));
    }

    #[tokio::test]
    async fn test_legacy_document_does_not_break_listing() {
        let store = Arc::new(MemoryDocumentStore::new());
        store
            .set(
                "customers",
                "legacy",
                json!({ "name": "Legacy", "email": "l@example.com", "status": null }),
            )
            .await
            .unwrap();
        let repo = repository(store);
        let customer = Customer::new(CustomerId::generate(), &CustomerInput::default(), Utc::now());
        repo.put(&customer).await.unwrap();

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 2);

        let page = repo.page(PageRequest::new(1, 10).unwrap()).await.unwrap();
        assert_eq!(page.total, 2);

        let legacy = repo.get("legacy").await.unwrap().unwrap();
        assert_eq!(legacy.name, "Legacy");
        assert_eq!(legacy.status.as_str(), "lead");
    }

    #[tokio::test]
    async fn test_page_reports_full_total() {
        let store = Arc::new(MemoryDocumentStore::new());
        let repo = repository(store);
        for _ in 0..12 {
            let customer =
                Customer::new(CustomerId::generate(), &CustomerInput::default(), Utc::now());
            repo.put(&customer).await.unwrap();
        }

        let page = repo.page(PageRequest::new(2, 5).unwrap()).await.unwrap();

        assert_eq!(page.total, 12);
        assert_eq!(page.data.len(), 5);
        assert_eq!(page.page, 2);
    }
}
