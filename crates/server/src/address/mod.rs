//! Address resolution against external lookup services.
//!
//! - **Forward lookup**: zip code to candidate localities, via the zipcloud
//!   zip code search API (no credential needed).
//! - **Reverse lookup**: structured address to postal code, via the Google
//!   Maps Geocoding API (`GOOGLE_MAPS_API_KEY` required).
//!
//! Each lookup is one blocking round trip with no retry. The `lookup_*`
//! methods return a typed [`LookupError`]; the `resolve_*` methods log the
//! error and collapse it into an empty result.

mod geocoding;
mod zipcloud;

use std::sync::Arc;

use secrecy::SecretString;
use thiserror::Error;

use crm_core::AddressCandidate;

use crate::config::AddressConfig;

/// Errors that can occur when calling an address lookup service.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The lookup needs a credential that is not configured.
    #[error("{0} is not configured")]
    Misconfigured(&'static str),

    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success HTTP status.
    #[error("HTTP status {0}")]
    Status(u16),

    /// The service reported an error in its response body.
    #[error("API error: {status} - {message}")]
    Api { status: String, message: String },

    /// Failed to parse the response or build the request URL.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Client for the two address lookup services.
#[derive(Clone)]
pub struct AddressGateway {
    inner: Arc<AddressGatewayInner>,
}

struct AddressGatewayInner {
    client: reqwest::Client,
    zipcloud_url: String,
    geocoding_url: String,
    api_key: Option<SecretString>,
}

impl AddressGateway {
    /// Create a gateway from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &AddressConfig) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(AddressGatewayInner {
                client,
                zipcloud_url: config.zipcloud_url.clone(),
                geocoding_url: config.geocoding_url.clone(),
                api_key: config.google_maps_api_key.clone(),
            }),
        })
    }

    /// Forward lookup that never fails.
    ///
    /// Service failures are logged and reported as "no candidates", so the
    /// caller cannot tell an outage from an unknown zip code.
    pub async fn resolve_address(&self, zip_code: &str) -> Vec<AddressCandidate> {
        match self.lookup_address(zip_code).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!(zip_code, error = %e, "Failed to fetch address for zip code");
                Vec::new()
            }
        }
    }

    /// Reverse lookup that never fails.
    ///
    /// A missing credential, a service failure and "no postal code found" all
    /// come back as `None`; only the log tells them apart.
    pub async fn resolve_postal_code(
        &self,
        prefecture: &str,
        city: &str,
        address1: Option<&str>,
    ) -> Option<String> {
        match self.lookup_postal_code(prefecture, city, address1).await {
            Ok(postal_code) => postal_code,
            Err(LookupError::Misconfigured(_)) => None,
            Err(e) => {
                tracing::warn!(prefecture, city, error = %e, "Failed to fetch zip code for address");
                None
            }
        }
    }
}

impl std::fmt::Debug for AddressGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressGateway")
            .field("zipcloud_url", &self.inner.zipcloud_url)
            .field("geocoding_url", &self.inner.geocoding_url)
            .field("api_key", &self.inner.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;

    #[test]
    fn test_debug_redacts_api_key() {
        let gateway = unreachable_gateway(Some("AIza-secret-key"));
        let debug_output = format!("{gateway:?}");

        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("AIza-secret-key"));
    }

    #[tokio::test]
    async fn test_resolve_address_absorbs_network_failure() {
        let gateway = unreachable_gateway(None);
        assert!(gateway.resolve_address("100-0005").await.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_postal_code_without_key_is_none() {
        let gateway = unreachable_gateway(None);
        let result = gateway
            .resolve_postal_code("東京都", "千代田区", Some("丸の内1-9-1"))
            .await;
        assert_eq!(result, None);
    }
}
