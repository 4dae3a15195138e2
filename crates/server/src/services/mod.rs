//! Business logic services.
//!
//! # Services
//!
//! - `customers` - Customer listing, search, create/update and address
//!   resolution

pub mod customers;

pub use customers::CustomerService;

use thiserror::Error;

use crm_core::PageRequestError;

use crate::address::LookupError;
use crate::db::StoreError;

/// Errors returned by service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The target record does not exist.
    #[error("{0}")]
    NotFound(String),

    /// An external address service failed.
    #[error("Integration failure: {0}")]
    IntegrationFailure(String),

    /// A required credential is not configured.
    #[error("Misconfigured: {0}")]
    Misconfigured(String),

    /// The request parameters are invalid.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The document store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Discriminant of a [`ServiceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    IntegrationFailure,
    Misconfigured,
    InvalidRequest,
    Storage,
}

impl ErrorKind {
    /// Stable name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not-found",
            Self::IntegrationFailure => "integration-failure",
            Self::Misconfigured => "misconfigured",
            Self::InvalidRequest => "invalid-request",
            Self::Storage => "storage",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ServiceError {
    /// The kind of failure, for per-kind handling by callers.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::IntegrationFailure(_) => ErrorKind::IntegrationFailure,
            Self::Misconfigured(_) => ErrorKind::Misconfigured,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }
}

impl From<LookupError> for ServiceError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::Misconfigured(name) => Self::Misconfigured(format!("{name} is not set")),
            other => Self::IntegrationFailure(other.to_string()),
        }
    }
}

impl From<PageRequestError> for ServiceError {
    fn from(err: PageRequestError) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}
