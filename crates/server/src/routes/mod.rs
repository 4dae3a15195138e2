//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Readiness check (document store ping)
//!
//! # RPC
//! POST /api/rpc                    - Any named action: {"action": ..., "params": {...}}
//!
//! # Customers
//! GET  /api/customers              - Paginated listing (?page=&pageSize=)
//! POST /api/customers              - Create customer
//! GET  /api/customers/search       - Search (?query=)
//! GET  /api/customers/{id}         - Get customer
//! PUT  /api/customers/{id}         - Update customer
//!
//! # Address lookup
//! GET  /api/address/by-zip         - Zip code to localities (?zipCode=)
//! GET  /api/address/zip-code       - Address to zip code (?prefecture=&city=&address1=)
//! ```
//!
//! Every `/api` response is an [`envelope::Envelope`].

pub mod actions;
pub mod address;
pub mod customers;
pub mod envelope;
pub mod health;

use axum::Router;

use crate::state::AppState;

pub use actions::{ApiAction, dispatch};

/// Build the complete router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(actions::router())
        .merge(customers::router())
        .merge(address::router())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::config::{AddressConfig, CrmConfig, StoreConfig};
    use crate::db::MemoryDocumentStore;

    fn app() -> Router {
        let config = CrmConfig {
            host: [127, 0, 0, 1].into(),
            port: 0,
            store: StoreConfig::default(),
            address: AddressConfig {
                zipcloud_url: "http://127.0.0.1:9/api/search".to_string(),
                geocoding_url: "http://127.0.0.1:9/maps/api/geocode/json".to_string(),
                ..AddressConfig::default()
            },
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        let state = AppState::new(&config, Arc::new(MemoryDocumentStore::new())).unwrap();
        routes().with_state(state)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn rpc(body: &Value) -> Request<Body> {
        Request::post("/api/rpc")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app()
            .oneshot(Request::get("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rpc_create_then_get() {
        let app = app();

        let (status, created) = send(
            &app,
            rpc(&json!({
                "action": "createCustomer",
                "params": { "name": "Sato", "email": "sato@example.com" }
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["status"], "success");
        assert_eq!(created["data"]["status"], "lead");
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let (status, fetched) = send(
            &app,
            Request::get(format!("/api/customers/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["data"], created["data"]);
    }

    #[tokio::test]
    async fn test_get_missing_customer() {
        let (status, body) = send(
            &app(),
            rpc(&json!({ "action": "getCustomerById", "params": { "id": "nope" } })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "status": "error", "message": "Customer not found" }));
    }

    #[tokio::test]
    async fn test_invalid_page_is_bad_request() {
        let (status, body) = send(
            &app(),
            Request::get("/api/customers?page=0&pageSize=10")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_malformed_rpc_body_gets_envelope() {
        let request = Request::post("/api/rpc")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, body) = send(&app(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_short_zip_code_is_not_found() {
        let (status, body) = send(
            &app(),
            Request::get("/api/address/by-zip?zipCode=123")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Address not found or invalid zip code");
    }

    #[tokio::test]
    async fn test_reverse_lookup_without_key() {
        let (status, body) = send(
            &app(),
            rpc(&json!({
                "action": "getZipCodeByAddress",
                "params": { "prefecture": "東京都", "city": "千代田区" }
            })),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["message"], "Zip code not found for the given address");
    }
}
