//! songrate-api library - song rating REST service
//!
//! Users register and log in to receive a signed access token; with it they
//! can browse and add artists and songs and rate songs from 1 to 10.

use std::sync::Arc;

use axum::http::HeaderName;
use axum::Router;
use songrate_common::api::TokenSigner;
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod pagination;
pub mod services;

use services::CatalogLookup;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Issues and verifies access tokens
    pub tokens: Arc<TokenSigner>,
    /// Song metadata lookup; `None` disables enrichment
    pub catalog: Option<Arc<dyn CatalogLookup>>,
}

impl AppState {
    /// Create new application state without a catalog
    pub fn new(db: SqlitePool, tokens: TokenSigner) -> Self {
        Self {
            db,
            tokens: Arc::new(tokens),
            catalog: None,
        }
    }

    /// Enable song metadata enrichment
    pub fn with_catalog(mut self, catalog: Arc<dyn CatalogLookup>) -> Self {
        self.catalog = Some(catalog);
        self
    }
}

/// Build application router
///
/// Registration, login and `/health` are public; every other route requires a
/// valid access token.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;

    // Protected routes (require authentication)
    let protected = Router::new()
        .merge(api::users::protected_routes())
        .merge(api::artists::routes())
        .merge(api::songs::routes())
        .merge(api::ratings::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .merge(api::users::public_routes())
        .merge(api::health_routes());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(api::AUTH_TOKEN_HEADER)]);

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
