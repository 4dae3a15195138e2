//! CRM Core - Shared customer domain types.
//!
//! This crate provides the types used across all CRM components:
//! - `server` - JSON API over the customer collection and address lookups
//! - `cli` - Command-line tools for migrations, seeding and ad-hoc lookups
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Record construction, the update merge rules, search
//! matching and page window arithmetic all live here so they can be tested
//! without a store.
//!
//! # Modules
//!
//! - [`types`] - Customers, statuses, IDs, address candidates and paging

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
