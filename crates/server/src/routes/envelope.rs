//! Uniform response wrapper for every API action.

use serde::{Deserialize, Serialize};

/// Outcome marker of an [`Envelope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

/// `{"status": "success"|"error", "data"?: ..., "message"?: ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: EnvelopeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Successful result carrying `data`.
    pub const fn success(data: T) -> Self {
        Self {
            status: EnvelopeStatus::Success,
            data: Some(data),
            message: None,
        }
    }

    /// Failed result carrying a client-facing message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: EnvelopeStatus::Error,
            data: None,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_success_shape() {
        let value = serde_json::to_value(Envelope::success(vec![1, 2])).unwrap();
        assert_eq!(value, json!({ "status": "success", "data": [1, 2] }));
    }

    #[test]
    fn test_error_shape() {
        let value = serde_json::to_value(Envelope::<()>::error("Customer not found")).unwrap();
        assert_eq!(
            value,
            json!({ "status": "error", "message": "Customer not found" })
        );
    }
}
