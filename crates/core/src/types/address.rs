//! Address lookup results and postal code normalization.

use serde::{Deserialize, Serialize};

/// Shortest zip code input worth sending to the lookup service.
///
/// Counted before hyphens are removed, so `100-000` passes the check.
pub const MIN_ZIP_CODE_LENGTH: usize = 7;

/// A locality matching a zip code.
///
/// One zip code can map to several localities; callers get all of them in
/// the order the lookup service returned them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressCandidate {
    pub prefecture: String,
    pub city: String,
    pub address1: String,
}

/// Prepare a zip code for forward lookup.
///
/// Returns `None` when the input is too short to be a zip code, otherwise
/// the input with hyphens stripped.
///
/// ```rust
/// # use crm_core::normalize_zip_code;
/// assert_eq!(normalize_zip_code("100-0005").as_deref(), Some("1000005"));
/// assert_eq!(normalize_zip_code("123"), None);
/// ```
#[must_use]
pub fn normalize_zip_code(zip_code: &str) -> Option<String> {
    if zip_code.chars().count() < MIN_ZIP_CODE_LENGTH {
        return None;
    }
    Some(zip_code.replace('-', ""))
}

/// Strip hyphens from a postal code returned by a geocoder.
#[must_use]
pub fn normalize_postal_code(postal_code: &str) -> String {
    postal_code.replace('-', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_zip_code_strips_hyphen() {
        assert_eq!(normalize_zip_code("060-0000").as_deref(), Some("0600000"));
        assert_eq!(normalize_zip_code("1000005").as_deref(), Some("1000005"));
    }

    #[test]
    fn test_normalize_zip_code_rejects_short_input() {
        assert_eq!(normalize_zip_code(""), None);
        assert_eq!(normalize_zip_code("123"), None);
        assert_eq!(normalize_zip_code("100-00"), None);
    }

    #[test]
    fn test_normalize_postal_code() {
        assert_eq!(normalize_postal_code("100-6701"), "1006701");
        assert_eq!(normalize_postal_code("1006701"), "1006701");
    }
}
