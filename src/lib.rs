pub mod config;
pub mod entities;
pub mod error;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

const DEFAULT_LOG_FILTER: &str = "asset_vault=info,tower_http=info";

/// Installs the fmt subscriber, filtered by `RUST_LOG` when set.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// The full application: routes, upload limit, request tracing and CORS.
pub fn build_app(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;

    routes::create_routes(state)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
