//! Core types for the CRM.
//!
//! This module provides type-safe wrappers for the customer domain.

pub mod address;
pub mod customer;
pub mod id;
pub mod page;
pub mod status;

pub use address::{AddressCandidate, MIN_ZIP_CODE_LENGTH, normalize_postal_code, normalize_zip_code};
pub use customer::{Customer, CustomerInput, SearchQuery};
pub use id::CustomerId;
pub use page::{Page, PageRequest, PageRequestError};
pub use status::CustomerStatus;
