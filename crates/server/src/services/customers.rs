//! Customer service.
//!
//! Listing and search run over a full scan of the collection (capped by
//! `CRM_LIST_LIMIT`); pagination is a window over that scan. Address lookups
//! go straight to the [`AddressGateway`] with typed errors, leaving the
//! decision to absorb or surface them to the caller.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info, instrument};

use crm_core::{
    AddressCandidate, Customer, CustomerId, CustomerInput, Page, PageRequest, SearchQuery,
};

use super::ServiceError;
use crate::address::AddressGateway;
use crate::db::CustomerRepository;

/// Page size of the unpaginated `getCustomers` listing.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

const NOT_FOUND_MESSAGE: &str = "Customer not found";

/// Customer listing, mutation and address resolution.
#[derive(Debug, Clone)]
pub struct CustomerService {
    repository: CustomerRepository,
    gateway: AddressGateway,
}

impl CustomerService {
    /// Create a new customer service.
    #[must_use]
    pub const fn new(repository: CustomerRepository, gateway: AddressGateway) -> Self {
        Self {
            repository,
            gateway,
        }
    }

    /// The address gateway used for lookups.
    #[must_use]
    pub const fn gateway(&self) -> &AddressGateway {
        &self.gateway
    }

    /// One page of customers ordered by ID, plus the collection size.
    ///
    /// A page past the end is empty but still reports the full `total`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if `page` or `page_size` is below 1, or
    /// `Storage` if the scan fails.
    #[instrument(skip(self))]
    pub async fn list_paginated(
        &self,
        page: i64,
        page_size: i64,
    ) -> Result<Page<Customer>, ServiceError> {
        let request = PageRequest::new(page, page_size)?;
        let page = self.repository.page(request).await?;
        debug!(total = page.total, returned = page.data.len(), "Listed customers");
        Ok(page)
    }

    /// The first page of customers without pagination metadata.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the scan fails.
    pub async fn list_first_page(&self) -> Result<Vec<Customer>, ServiceError> {
        Ok(self.list_paginated(1, DEFAULT_PAGE_SIZE).await?.data)
    }

    /// Customers matching `query`; everyone when it is absent or empty.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the scan fails.
    #[instrument(skip(self))]
    pub async fn search(&self, query: Option<&str>) -> Result<Vec<Customer>, ServiceError> {
        let customers = self.repository.list_all().await?;

        let Some(query) = query.and_then(SearchQuery::new) else {
            return Ok(customers);
        };

        let matches: Vec<Customer> = customers
            .into_iter()
            .filter(|customer| query.matches(customer))
            .collect();
        debug!(matches = matches.len(), "Searched customers");
        Ok(matches)
    }

    /// A single customer, or `None` if no record has this ID.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the read fails.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Customer>, ServiceError> {
        Ok(self.repository.get(id).await?)
    }

    /// Create a customer with a fresh ID.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the write fails.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CustomerInput) -> Result<Customer, ServiceError> {
        let customer = Customer::new(CustomerId::generate(), &input, Utc::now());
        self.repository.put(&customer).await?;
        info!(customer_id = %customer.id, "Created customer");
        Ok(customer)
    }

    /// Merge `input` into an existing customer.
    ///
    /// Empty or absent fields keep their stored values. `createdAt` is kept
    /// and `updatedAt` always moves forward.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no record has this ID, or `Storage` if the read
    /// or write fails.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: &str, input: CustomerInput) -> Result<Customer, ServiceError> {
        let Some(existing) = self.repository.get(id).await? else {
            return Err(ServiceError::NotFound(NOT_FOUND_MESSAGE.to_string()));
        };

        let updated = existing.merged_with(&input, next_timestamp(existing.updated_at));
        self.repository.put(&updated).await?;
        info!(customer_id = %updated.id, "Updated customer");
        Ok(updated)
    }

    /// Candidate localities for a zip code.
    ///
    /// An absent or short zip code yields no candidates.
    ///
    /// # Errors
    ///
    /// Returns `IntegrationFailure` if the lookup service fails.
    pub async fn resolve_address(
        &self,
        zip_code: Option<&str>,
    ) -> Result<Vec<AddressCandidate>, ServiceError> {
        let Some(zip_code) = zip_code else {
            return Ok(Vec::new());
        };
        Ok(self.gateway.lookup_address(zip_code).await?)
    }

    /// Postal code for an address, or `None` if the geocoder has none.
    ///
    /// # Errors
    ///
    /// Returns `Misconfigured` without a geocoding key, or
    /// `IntegrationFailure` if the geocoder fails.
    pub async fn resolve_postal_code(
        &self,
        prefecture: Option<&str>,
        city: Option<&str>,
        address1: Option<&str>,
    ) -> Result<Option<String>, ServiceError> {
        let Some(prefecture) = prefecture else {
            return Ok(None);
        };
        Ok(self
            .gateway
            .lookup_postal_code(prefecture, city.unwrap_or_default(), address1)
            .await?)
    }
}

/// `now`, or just after `previous` if the clock has not moved past it.
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    Utc::now().max(previous + TimeDelta::milliseconds(1))
}
