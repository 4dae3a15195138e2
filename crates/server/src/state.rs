//! Application state shared across handlers.

use std::sync::Arc;

use crate::address::{AddressGateway, LookupError};
use crate::config::CrmConfig;
use crate::db::{CustomerRepository, DocumentStore};
use crate::services::CustomerService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn DocumentStore>,
    customers: CustomerService,
}

impl AppState {
    /// Wire the customer service to `store` and the configured address
    /// services.
    ///
    /// # Errors
    ///
    /// Returns error if the address gateway's HTTP client fails to build.
    pub fn new(config: &CrmConfig, store: Arc<dyn DocumentStore>) -> Result<Self, LookupError> {
        let gateway = AddressGateway::new(&config.address)?;
        if !config.address.reverse_lookup_enabled() {
            tracing::warn!("GOOGLE_MAPS_API_KEY not set, reverse lookup disabled");
        }

        let repository = CustomerRepository::new(
            Arc::clone(&store),
            config.store.collection.clone(),
            config.store.list_limit,
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                store,
                customers: CustomerService::new(repository, gateway),
            }),
        })
    }

    /// Get a reference to the document store.
    #[must_use]
    pub fn store(&self) -> &dyn DocumentStore {
        self.inner.store.as_ref()
    }

    /// Get a reference to the customer service.
    #[must_use]
    pub fn customers(&self) -> &CustomerService {
        &self.inner.customers
    }
}
