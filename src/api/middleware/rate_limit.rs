//! Per-client rate limiting middleware for the API surface.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::state::AppState;
use crate::utils::client_ip::ClientIdentity;

/// Admits the request through [`crate::domain::rate_limiter::RateLimiter`].
///
/// The key is the caller's [`ClientIdentity`]. Rejected requests receive
/// `429 Too Many Requests` with a plain text body and never reach the handler.
///
/// # Example
///
/// ```rust,ignore
/// let api = Router::new()
///     .route("/shorten", post(shorten_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit::layer));
/// ```
pub async fn layer(
    State(state): State<AppState>,
    identity: ClientIdentity,
    req: Request,
    next: Next,
) -> Response {
    if let Err(e) = state.rate_limiter.check(identity.as_str()) {
        debug!(client = %identity, "Rate limit exceeded");
        metrics::counter!("rate_limit_rejections_total").increment(1);
        return e.into_response();
    }

    next.run(req).await
}
