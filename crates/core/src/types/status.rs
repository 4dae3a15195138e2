//! Customer lifecycle status.

use serde::{Deserialize, Serialize};

/// Customer status.
///
/// Always one of the three known values. Stored documents or form input
/// carrying anything else are read as [`CustomerStatus::Lead`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum CustomerStatus {
    /// Paying or engaged customer.
    Active,
    /// Former customer.
    Inactive,
    /// Prospect that has not converted yet.
    #[default]
    Lead,
}

impl CustomerStatus {
    /// Parse status input leniently, falling back to [`CustomerStatus::Lead`].
    #[must_use]
    pub fn from_input(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Lead => "lead",
        }
    }
}

impl std::fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CustomerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "lead" => Ok(Self::Lead),
            _ => Err(format!("invalid customer status: {s}")),
        }
    }
}

impl From<String> for CustomerStatus {
    fn from(s: String) -> Self {
        Self::from_input(&s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_known_values() {
        assert_eq!("active".parse::<CustomerStatus>(), Ok(CustomerStatus::Active));
        assert_eq!("inactive".parse::<CustomerStatus>(), Ok(CustomerStatus::Inactive));
        assert_eq!("lead".parse::<CustomerStatus>(), Ok(CustomerStatus::Lead));
        assert!("ACTIVE".parse::<CustomerStatus>().is_err());
    }

    #[test]
    fn test_unknown_input_defaults_to_lead() {
        assert_eq!(CustomerStatus::from_input("vip"), CustomerStatus::Lead);
        assert_eq!(CustomerStatus::from_input(""), CustomerStatus::Lead);
    }

    #[test]
    fn test_serde() {
        assert_eq!(
            serde_json::to_string(&CustomerStatus::Inactive).unwrap(),
            "\"inactive\""
        );
        let parsed: CustomerStatus = serde_json::from_str("\"active\"").unwrap();
        assert_eq!(parsed, CustomerStatus::Active);

        let unknown: CustomerStatus = serde_json::from_str("\"archived\"").unwrap();
        assert_eq!(unknown, CustomerStatus::Lead);
    }
}
