// src/server/mod.rs
//! HTTP surface of the mirror.

mod handlers;

use crate::pipeline::Mirror;
use axum::{routing::get, Router};
use std::sync::Arc;

pub use handlers::ApiFailure;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub mirror: Arc<Mirror>,
}

impl AppState {
    pub fn new(mirror: Mirror) -> Self {
        Self {
            mirror: Arc::new(mirror),
        }
    }
}

/// Build the HTTP router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/notion", get(handlers::list_collection))
        .route(
            "/api/notion/",
            get(handlers::missing_page_id).delete(handlers::missing_page_id),
        )
        .route(
            "/api/notion/{id}",
            get(handlers::get_page).delete(handlers::delete_page),
        )
        .route("/api/redis-test", get(handlers::cache_probe))
        .route("/health", get(handlers::health_check))
        .with_state(state)
}
