//! HTTP surface of the gateway.

pub mod generate;
pub mod health;
pub mod index;
pub mod prompts;
pub mod shutdown;

use std::sync::Arc;

use axum::{middleware, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::AppState;

/// Build the full application router, static serving and layers included.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(index::router())
        .merge(health::router())
        .merge(generate::router(state.clone()))
        .merge(prompts::router(state.clone()))
        .merge(shutdown::router(state.clone()))
        .nest_service("/static", ServeDir::new(state.artifacts.root()))
        .layer(middleware::from_fn(crate::logging::request_logger))
        .layer(cors)
}
