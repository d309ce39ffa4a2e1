pub mod config;
pub mod error;
pub mod state;
pub mod auth;
pub mod db;
pub mod models;
pub mod report;
pub mod routes;
pub mod storage;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::{AppState, SharedState};
use crate::storage::local::LocalBlobStore;
use crate::storage::BlobStore;

/// Builds the app with the filesystem blob store rooted at `config.storage_dir`.
pub fn build_app(pool: PgPool, config: Config) -> (Router, SharedState) {
    let storage = Arc::new(LocalBlobStore::from_config(&config));
    build_app_with_storage(pool, config, storage)
}

pub fn build_app_with_storage(
    pool: PgPool,
    config: Config,
    storage: Arc<dyn BlobStore>,
) -> (Router, SharedState) {
    let local_files = LocalBlobStore::from_config(&config);
    let max_upload_bytes = config.max_upload_bytes;

    let state: SharedState = Arc::new(AppState {
        pool,
        config,
        storage,
        local_files,
    });

    let security_headers = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ));

    let app = Router::new()
        .merge(routes::api_routes())
        .merge(routes::file_routes())
        .route("/health", axum::routing::get(health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(security_headers)
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    (app, state)
}

async fn health() -> &'static str {
    "ok"
}
