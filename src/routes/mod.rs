pub mod api;

use std::sync::Arc;

use axum::{Router, routing::get};

use crate::handlers;
use crate::state::AppState;

/// Public health check plus the API routes, bound to `state`.
///
/// Cross-cutting layers (CORS, rate limiting, security headers) are added in
/// `main.rs`.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::api::health_check))
        .merge(api::create_api_router())
        .with_state(state)
}
