//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use tracing::debug;

use crate::domain::click_event::ClickEvent;
use crate::domain::click_worker::enqueue_click;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::ClientIdentity;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Resolve the code through the cache or the store
/// 2. Reject expired links exactly like missing ones
/// 3. Queue a click event for the background worker
/// 4. Return `301 Moved Permanently`
///
/// The click is recorded after the response is sent. If the queue is full
/// the click is dropped; the redirect is never delayed.
///
/// # Errors
///
/// Returns 404 Not Found if the code doesn't exist or has expired.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    identity: ClientIdentity,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let link = state.link_service.resolve(&code).await?;

    debug!(code = %code, "Redirecting");

    let event = ClickEvent::new(
        link.code,
        Some(identity.into_inner()),
        headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok()),
        headers.get(header::REFERER).and_then(|v| v.to_str().ok()),
        state.clock.now(),
    );
    enqueue_click(&state.click_sender, event);

    Ok((
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, link.destination)],
    ))
}
