//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`   - Short link redirect (not rate limited)
//! - `GET  /health`   - Health check: DB, cache, click queue
//! - `/api/v1/*`      - REST API (rate limited per client)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Security headers / CORS** - Applied to every response
//! - **Rate limiting** - Fixed window per client identity, API only

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{security_headers, tracing};
use crate::state::AppState;
use axum::Router;
use axum::routing::get;

/// Constructs the application router with all routes and middleware.
///
/// Trailing-slash normalization is added by [`crate::server::run`] around
/// the finished router.
pub fn app_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/{code}", get(redirect_handler))
        .nest("/api/v1", api::routes::api_routes(state.clone()))
        .with_state(state);

    security_headers::apply(router).layer(tracing::layer())
}
