//! Customer identifiers.
//!
//! Customer IDs are opaque strings. New records get a random UUID, but IDs
//! read back from the document store are accepted as-is since older records
//! may have been written by other tools.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, immutable identifier of a customer document.
///
/// ```rust
/// # use crm_core::CustomerId;
/// let id = CustomerId::generate();
/// assert_eq!(id.as_str().len(), 36);
///
/// let legacy = CustomerId::from("cust-0001");
/// assert_eq!(legacy.to_string(), "cust-0001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    /// Generate a fresh random ID (UUID v4, hyphenated).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CustomerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for CustomerId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}
