//! CRM server binary.
//!
//! Serves the customer API on `CRM_HOST:CRM_PORT` (default
//! `127.0.0.1:3000`).
//!
//! # Architecture
//!
//! - Axum web framework, JSON envelope responses
//! - Document store: `PostgreSQL` when `CRM_DATABASE_URL` is set, in memory
//!   otherwise
//! - zipcloud for zip code to address lookups
//! - Google Maps Geocoding for address to zip code lookups
//!
//! Migrations are not run on startup. Run them with `crm-cli migrate`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::Router;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crm_server::{
    config::CrmConfig,
    db, routes,
    state::AppState,
    telemetry::{self, LogOutput},
};

#[tokio::main]
async fn main() {
    let config = CrmConfig::from_env().expect("Failed to load configuration");

    let sentry_guard = telemetry::init_sentry(&config);
    telemetry::init_tracing(
        config.log_json,
        "crm_server=info,tower_http=debug",
        LogOutput::Stdout,
    );
    if sentry_guard.is_some() {
        tracing::info!("Sentry initialized");
    }

    let store = db::connect(&config.store)
        .await
        .expect("Failed to connect to document store");

    let state = AppState::new(&config, store).expect("Failed to create application state");

    let app = Router::new()
        .merge(routes::routes())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    tracing::info!("crm-server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Resolve on Ctrl+C or SIGTERM, logging which one arrived.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        "SIGINT"
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
        "SIGTERM"
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    let signal = tokio::select! {
        signal = ctrl_c => signal,
        signal = terminate => signal,
    };

    tracing::info!(signal, "Shutting down, draining open connections");
}
