//! CRM server library.
//!
//! Customer records live in a document store (`PostgreSQL` or in memory) and
//! are served over a JSON API whose every response is a
//! `{status, data, message}` envelope. Zip codes are resolved to addresses
//! and back through two external lookup services.
//!
//! The binary in `main.rs` wires these modules to configuration, [`telemetry`]
//! and an HTTP listener; the CLI and integration tests use them directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod address;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
