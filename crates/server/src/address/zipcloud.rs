//! Forward lookup: zip code to localities.
//!
//! # API Reference
//!
//! - `GET {ZIPCLOUD_API_URL}?zipcode=1000005`
//! - Body: `{"status": 200, "message": null, "results": [{"address1": "東京都",
//!   "address2": "千代田区", "address3": "丸の内", ...}]}`
//! - `results` is `null` when nothing matches. `status` mirrors an HTTP code
//!   and is 400 for malformed zip codes.

use serde::Deserialize;
use tracing::{debug, instrument};

use crm_core::{AddressCandidate, normalize_zip_code};

use super::{AddressGateway, LookupError};

#[derive(Debug, Deserialize)]
struct ZipSearchResponse {
    status: u16,
    message: Option<String>,
    results: Option<Vec<ZipSearchResult>>,
}

#[derive(Debug, Deserialize)]
struct ZipSearchResult {
    /// Prefecture.
    address1: String,
    /// City, ward, town or village.
    address2: String,
    /// Town area.
    #[serde(default)]
    address3: String,
}

impl From<ZipSearchResult> for AddressCandidate {
    fn from(result: ZipSearchResult) -> Self {
        Self {
            prefecture: result.address1,
            city: result.address2,
            address1: result.address3,
        }
    }
}

impl AddressGateway {
    /// Look up the localities for a zip code.
    ///
    /// Inputs shorter than seven characters return no candidates without a
    /// request being sent. Hyphens are stripped before querying. All
    /// candidates are returned in service order.
    ///
    /// # Errors
    ///
    /// Returns `LookupError` if the request fails or the service reports an
    /// error.
    #[instrument(skip(self))]
    pub async fn lookup_address(&self, zip_code: &str) -> Result<Vec<AddressCandidate>, LookupError> {
        let Some(zip_code) = normalize_zip_code(zip_code) else {
            debug!("Zip code too short, skipping lookup");
            return Ok(Vec::new());
        };

        let url = url::Url::parse_with_params(&self.inner.zipcloud_url, &[("zipcode", &zip_code)])
            .map_err(|e| LookupError::Parse(format!("invalid zip code search URL: {e}")))?;

        let response = self.inner.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body: ZipSearchResponse = response
            .json()
            .await
            .map_err(|e| LookupError::Parse(format!("Failed to parse response: {e}")))?;

        if body.status != 200 {
            return Err(LookupError::Api {
                status: body.status.to_string(),
                message: body.message.unwrap_or_default(),
            });
        }

        let candidates: Vec<AddressCandidate> = body
            .results
            .unwrap_or_default()
            .into_iter()
            .map(AddressCandidate::from)
            .collect();

        debug!(count = candidates.len(), "Zip code lookup complete");
        Ok(candidates)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::address::test_support::{gateway, unreachable_gateway};

    #[tokio::test]
    async fn test_single_match() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(Method::GET)
                    .path("/api/search")
                    .query_param("zipcode", "1000005");
                then.status(200).json_body(json!({
                    "message": null,
                    "results": [{
                        "address1": "東京都",
                        "address2": "千代田区",
                        "address3": "丸の内",
                        "kana1": "ﾄｳｷｮｳﾄ",
                        "kana2": "ﾁﾖﾀﾞｸ",
                        "kana3": "ﾏﾙﾉｳﾁ",
                        "prefcode": "13",
                        "zipcode": "1000005"
                    }],
                    "status": 200
                }));
            })
            .await;

        let candidates = gateway(&server.base_url(), None)
            .lookup_address("100-0005")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            candidates,
            vec![AddressCandidate {
                prefecture: "東京都".to_string(),
                city: "千代田区".to_string(),
                address1: "丸の内".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_multiple_matches_preserved_in_order() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(Method::GET)
                    .path("/api/search")
                    .query_param("zipcode", "0600000");
                then.status(200).json_body(json!({
                    "message": null,
                    "results": [
                        { "address1": "北海道", "address2": "札幌市中央区", "address3": "" },
                        { "address1": "北海道", "address2": "札幌市北区", "address3": "" }
                    ],
                    "status": 200
                }));
            })
            .await;

        let candidates = gateway(&server.base_url(), None)
            .lookup_address("060-0000")
            .await
            .unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].city, "札幌市中央区");
        assert_eq!(candidates[1].city, "札幌市北区");
    }

    #[tokio::test]
    async fn test_no_results() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(Method::GET).path("/api/search");
                then.status(200)
                    .json_body(json!({ "message": null, "results": null, "status": 200 }));
            })
            .await;

        let candidates = gateway(&server.base_url(), None)
            .lookup_address("9999999")
            .await
            .unwrap();

        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn test_short_zip_code_skips_request() {
        // Any request to this gateway would fail, so Ok proves none was sent.
        let candidates = unreachable_gateway(None).lookup_address("123").await.unwrap();
        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn test_service_error_status_in_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(Method::GET).path("/api/search");
                then.status(200).json_body(json!({
                    "message": "パラメータ「郵便番号」の桁数が不正です。",
                    "results": null,
                    "status": 400
                }));
            })
            .await;

        let result = gateway(&server.base_url(), None)
            .lookup_address("12345678")
            .await;

        assert!(matches!(result, Err(LookupError::Api { ref status, .. }) if status == "400"));
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(Method::GET).path("/api/search");
                then.status(503);
            })
            .await;

        let result = gateway(&server.base_url(), None)
            .lookup_address("1000005")
            .await;

        assert!(matches!(result, Err(LookupError::Status(503))));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(Method::GET).path("/api/search");
                then.status(200).body("<html>maintenance</html>");
            })
            .await;

        let result = gateway(&server.base_url(), None)
            .lookup_address("1000005")
            .await;

        assert!(matches!(result, Err(LookupError::Parse(_))));
    }
}
