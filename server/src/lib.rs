//! Tabula Server - HTTP service hosting named tabular engines.
//!
//! Each table is a `TabularEngine` from `tabula-engine`. Screens create a
//! table, then drive it with JSON commands and read back the resulting view.

pub mod config;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod routes;

use crate::config::Config;
use crate::registry::TableRegistry;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<TableRegistry>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Build state with an empty registry.
    pub fn new(config: Config) -> Self {
        Self {
            registry: TableRegistry::new_shared(config.default_page_size),
            config: Arc::new(config),
        }
    }
}

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::create_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
