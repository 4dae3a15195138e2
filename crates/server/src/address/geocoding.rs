//! Reverse lookup: structured address to postal code.
//!
//! # API Reference
//!
//! - `GET {GEOCODING_API_URL}?address=...&language=ja&region=jp&key=...`
//! - Body: `{"status": "OK", "results": [{"address_components": [{"long_name":
//!   "100-6701", "types": ["postal_code"]}, ...]}]}`
//! - `status` is `ZERO_RESULTS` when the address is unknown; other non-`OK`
//!   values (`REQUEST_DENIED`, `OVER_QUERY_LIMIT`, ...) carry an
//!   `error_message`.

use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crm_core::normalize_postal_code;

use super::{AddressGateway, LookupError};

const POSTAL_CODE_TYPE: &str = "postal_code";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    address_components: Vec<AddressComponent>,
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    long_name: String,
    #[serde(default)]
    types: Vec<String>,
}

impl GeocodeResult {
    fn postal_code(&self) -> Option<&str> {
        self.address_components
            .iter()
            .find(|c| c.types.iter().any(|t| t == POSTAL_CODE_TYPE))
            .map(|c| c.long_name.as_str())
    }
}

/// Join the non-empty address parts into one free-text query.
fn address_query(prefecture: &str, city: &str, address1: Option<&str>) -> String {
    [Some(prefecture), Some(city), address1]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl AddressGateway {
    /// Look up the postal code for an address.
    ///
    /// Returns `Ok(None)` without a request when `prefecture` is empty, and
    /// when the geocoder finds nothing or its first result has no postal code
    /// component. Only the first result is considered.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::Misconfigured` if no API key is configured, or
    /// another `LookupError` if the request fails or the geocoder reports an
    /// error.
    #[instrument(skip(self))]
    pub async fn lookup_postal_code(
        &self,
        prefecture: &str,
        city: &str,
        address1: Option<&str>,
    ) -> Result<Option<String>, LookupError> {
        if prefecture.trim().is_empty() {
            debug!("No prefecture given, skipping lookup");
            return Ok(None);
        }

        let Some(api_key) = self.inner.api_key.as_ref() else {
            warn!("GOOGLE_MAPS_API_KEY not set, reverse lookup disabled");
            return Err(LookupError::Misconfigured("GOOGLE_MAPS_API_KEY"));
        };

        let query = address_query(prefecture, city, address1);
        let url = url::Url::parse_with_params(
            &self.inner.geocoding_url,
            &[
                ("address", query.as_str()),
                ("language", "ja"),
                ("region", "jp"),
                ("key", api_key.expose_secret()),
            ],
        )
        .map_err(|e| LookupError::Parse(format!("invalid geocoding URL: {e}")))?;

        // The URL carries the API key, so it is stripped from every error.
        let response = self
            .inner
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LookupError::Http(e.without_url()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body: GeocodeResponse = response.json().await.map_err(|e| {
            LookupError::Parse(format!("Failed to parse response: {}", e.without_url()))
        })?;

        match body.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" => {
                warn!(query = %query, "No postal code found for address");
                return Ok(None);
            }
            _ => {
                return Err(LookupError::Api {
                    status: body.status,
                    message: body.error_message.unwrap_or_default(),
                });
            }
        }

        let postal_code = body
            .results
            .first()
            .and_then(GeocodeResult::postal_code)
            .map(normalize_postal_code);

        if postal_code.is_none() {
            warn!(query = %query, "No postal code found for address");
        }

        Ok(postal_code)
    }
}
