//! End-to-end tests against a `PostgreSQL` document store.
//!
//! These tests require a database reachable at `CRM_TEST_DATABASE_URL`.
//!
//! Run with: cargo test -p crm-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use reqwest::StatusCode;
use secrecy::SecretString;
use serde_json::json;

use crm_integration_tests::{TEST_MAPS_KEY, TestContext};
use crm_server::db::{self, PgDocumentStore};

async fn postgres_context() -> TestContext {
    let url = std::env::var("CRM_TEST_DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/crm_test".to_string());
    let pool = db::create_pool(&SecretString::from(url)).await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    TestContext::start(Some(TEST_MAPS_KEY), Arc::new(PgDocumentStore::new(pool))).await
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_create_update_persists() {
    let ctx = postgres_context().await;

    let created = ctx
        .create_customer(json!({ "name": "Postgres", "email": "pg@example.com" }))
        .await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = ctx
        .put(&format!("/api/customers/{id}"), &json!({ "status": "inactive" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "inactive");

    let (status, body) = ctx.get(&format!("/api/customers/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["createdAt"], created["createdAt"]);
    assert_eq!(body["data"]["status"], "inactive");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_readiness() {
    let ctx = postgres_context().await;

    let response = ctx.client.get(ctx.url("/health/ready")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
