//! API route configuration.

use crate::api::handlers::{analytics_handler, shorten_handler, urls_handler};
use crate::api::middleware::rate_limit;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Versioned API routes, mounted under `/api/v1`.
///
/// # Endpoints
///
/// - `POST /shorten`           - Create a short link
/// - `GET  /analytics/{code}`  - Traffic report for a link
/// - `GET  /urls`              - Links created by the caller
///
/// Every route is behind the per-client rate limiter.
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/analytics/{code}", get(analytics_handler))
        .route("/urls", get(urls_handler))
        .route_layer(middleware::from_fn_with_state(state, rate_limit::layer))
}
