//! Integration tests for the CRM API.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p crm-integration-tests
//!
//! # Including the PostgreSQL-backed tests
//! CRM_TEST_DATABASE_URL=postgres://localhost/crm_test \
//!     cargo test -p crm-integration-tests -- --include-ignored
//! ```
//!
//! Each [`TestContext`] serves the full router on an ephemeral port, backed
//! by an in-memory document store, with both address services replaced by
//! an `httpmock` server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use httpmock::MockServer;
use reqwest::{Client, Response, StatusCode};
use secrecy::SecretString;
use serde::Serialize;
use serde_json::{Value, json};

use crm_server::config::{AddressConfig, CrmConfig, StoreConfig};
use crm_server::db::{DocumentStore, MemoryDocumentStore};
use crm_server::routes;
use crm_server::state::AppState;

/// Geocoding key handed to the server when reverse lookup is enabled.
pub const TEST_MAPS_KEY: &str = "test-maps-key";

/// A running server plus a mock for its external address services.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub address_mock: MockServer,
}

impl TestContext {
    /// Server with reverse lookup enabled and an empty in-memory store.
    pub async fn new() -> Self {
        Self::start(Some(TEST_MAPS_KEY), Arc::new(MemoryDocumentStore::new())).await
    }

    /// Server without a geocoding key.
    pub async fn without_maps_key() -> Self {
        Self::start(None, Arc::new(MemoryDocumentStore::new())).await
    }

    /// Server over an arbitrary document store.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be started.
    #[allow(clippy::unwrap_used)]
    pub async fn start(maps_key: Option<&str>, store: Arc<dyn DocumentStore>) -> Self {
        let address_mock = MockServer::start_async().await;

        let config = CrmConfig {
            host: [127, 0, 0, 1].into(),
            port: 0,
            store: StoreConfig::default(),
            address: AddressConfig {
                zipcloud_url: format!("{}/api/search", address_mock.base_url()),
                geocoding_url: format!("{}/maps/api/geocode/json", address_mock.base_url()),
                google_maps_api_key: maps_key.map(SecretString::from),
                timeout: Duration::from_secs(5),
            },
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };

        let state = AppState::new(&config, store).unwrap();
        let app = routes::routes().with_state(state);

        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            client: Client::new(),
            base_url: format!("http://{addr}"),
            address_mock,
        }
    }

    /// Absolute URL for `path`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET path`, returning status and JSON body.
    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        read(self.client.get(self.url(path)).send().await).await
    }

    /// `POST path` with a JSON body.
    pub async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> (StatusCode, Value) {
        read(self.client.post(self.url(path)).json(body).send().await).await
    }

    /// `PUT path` with a JSON body.
    pub async fn put<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> (StatusCode, Value) {
        read(self.client.put(self.url(path)).json(body).send().await).await
    }

    /// Run a named action through `POST /api/rpc`.
    pub async fn rpc(&self, action: &str, params: Value) -> (StatusCode, Value) {
        self.post("/api/rpc", &json!({ "action": action, "params": params }))
            .await
    }

    /// Create a customer and return its `data`.
    ///
    /// # Panics
    ///
    /// Panics if creation does not succeed.
    pub async fn create_customer(&self, fields: Value) -> Value {
        let (status, body) = self.post("/api/customers", &fields).await;
        assert_eq!(status, StatusCode::OK, "create failed: {body}");
        assert_eq!(body["status"], "success");
        body["data"].clone()
    }
}

#[allow(clippy::unwrap_used)]
async fn read(response: reqwest::Result<Response>) -> (StatusCode, Value) {
    let response = response.unwrap();
    let status = response.status();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
}
