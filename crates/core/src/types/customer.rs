//! The customer record and the rules for creating, merging and searching it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::CustomerId;
use super::status::CustomerStatus;

/// A persisted customer.
///
/// Optional contact and address fields are stored as empty strings rather
/// than being omitted, so every document read back has the same shape.
/// Reading is lenient: absent or `null` fields get defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredCustomer")]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub zip_code: String,
    pub prefecture: String,
    pub city: String,
    /// Street address.
    pub address1: String,
    /// Building name, room number, etc.
    pub address2: String,
    pub status: CustomerStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A customer document as it may be found in the store.
///
/// Documents written by other tools can lack fields or hold `null`. Missing
/// text becomes empty, a missing status becomes `lead`, and a missing
/// timestamp is taken from the other one, or from the current time when both
/// are absent.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCustomer {
    id: CustomerId,
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    zip_code: Option<String>,
    prefecture: Option<String>,
    city: Option<String>,
    address1: Option<String>,
    address2: Option<String>,
    status: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<StoredCustomer> for Customer {
    fn from(stored: StoredCustomer) -> Self {
        let (created_at, updated_at) = match (stored.created_at, stored.updated_at) {
            (Some(created), Some(updated)) => (created, updated),
            (Some(at), None) | (None, Some(at)) => (at, at),
            (None, None) => {
                let now = Utc::now();
                (now, now)
            }
        };

        Self {
            id: stored.id,
            name: stored.name.unwrap_or_default(),
            email: stored.email.unwrap_or_default(),
            phone: stored.phone.unwrap_or_default(),
            zip_code: stored.zip_code.unwrap_or_default(),
            prefecture: stored.prefecture.unwrap_or_default(),
            city: stored.city.unwrap_or_default(),
            address1: stored.address1.unwrap_or_default(),
            address2: stored.address2.unwrap_or_default(),
            status: stored
                .status
                .as_deref()
                .map_or_else(CustomerStatus::default, CustomerStatus::from_input),
            created_at,
            updated_at,
        }
    }
}

/// Partial customer fields as submitted by the frontend forms.
///
/// Every field is optional. An empty string counts as "not supplied".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub zip_code: Option<String>,
    pub prefecture: Option<String>,
    pub city: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub status: Option<String>,
}

/// Returns the supplied value only if it is present and non-empty.
fn supplied(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

/// Supplied value, else the existing one.
fn merged(input: Option<&String>, existing: &str) -> String {
    supplied(input).unwrap_or(existing).to_owned()
}

impl Customer {
    /// Materialize a new customer from form input.
    ///
    /// Missing fields become empty strings and a missing status becomes
    /// `lead`. `created_at` and `updated_at` are both set to `now`.
    #[must_use]
    pub fn new(id: CustomerId, input: &CustomerInput, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: merged(input.name.as_ref(), ""),
            email: merged(input.email.as_ref(), ""),
            phone: merged(input.phone.as_ref(), ""),
            zip_code: merged(input.zip_code.as_ref(), ""),
            prefecture: merged(input.prefecture.as_ref(), ""),
            city: merged(input.city.as_ref(), ""),
            address1: merged(input.address1.as_ref(), ""),
            address2: merged(input.address2.as_ref(), ""),
            status: supplied(input.status.as_ref()).map_or_else(
                CustomerStatus::default,
                CustomerStatus::from_input,
            ),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an update on top of this record.
    ///
    /// Non-empty input fields overwrite, everything else keeps the stored
    /// value. An update therefore cannot clear a field back to an empty
    /// string; the forms rely on this. `id` and `created_at` are never
    /// changed and `updated_at` becomes `now`. A legacy record without a
    /// creation time keeps the one it was given when read, so the first
    /// update persists it.
    #[must_use]
    pub fn merged_with(&self, input: &CustomerInput, now: DateTime<Utc>) -> Self {
        Self {
            id: self.id.clone(),
            name: merged(input.name.as_ref(), &self.name),
            email: merged(input.email.as_ref(), &self.email),
            phone: merged(input.phone.as_ref(), &self.phone),
            zip_code: merged(input.zip_code.as_ref(), &self.zip_code),
            prefecture: merged(input.prefecture.as_ref(), &self.prefecture),
            city: merged(input.city.as_ref(), &self.city),
            address1: merged(input.address1.as_ref(), &self.address1),
            address2: merged(input.address2.as_ref(), &self.address2),
            status: supplied(input.status.as_ref())
                .map_or(self.status, CustomerStatus::from_input),
            created_at: self.created_at,
            updated_at: now,
        }
    }
}

/// A free-text customer search.
///
/// Name and email match case-insensitively; phone numbers match as a raw
/// substring since they are never case-folded.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    raw: String,
    folded: String,
}

impl SearchQuery {
    /// Build a query. Returns `None` for an empty query, which means "match
    /// everything".
    #[must_use]
    pub fn new(query: &str) -> Option<Self> {
        if query.is_empty() {
            return None;
        }
        Some(Self {
            raw: query.to_owned(),
            folded: query.to_lowercase(),
        })
    }

    /// Whether `customer` satisfies this query.
    #[must_use]
    pub fn matches(&self, customer: &Customer) -> bool {
        customer.name.to_lowercase().contains(&self.folded)
            || customer.email.to_lowercase().contains(&self.folded)
            || customer.phone.contains(&self.raw)
    }
}
