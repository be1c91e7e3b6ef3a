//! HTTP API layer with Axum routes.
//!
//! This crate exposes the ledger's operation contracts over HTTP. It is
//! deliberately thin: request parsing, the idempotency-key header, and
//! error-code mapping. Authentication and session handling live outside
//! this service.

pub mod error;
pub mod extractors;
pub mod routes;

use axum::Router;
use cortado_shared::config::FeatureConfig;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Feature flags (dev endpoints).
    pub features: FeatureConfig,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
