//! Handler for the link shortening endpoint.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::application::services::CreateLink;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::ClientIdentity;

/// Creates a short link owned by the calling client.
///
/// # Endpoint
///
/// `POST /api/v1/shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "originalUrl": "https://example.com/page",
///   "customCode": "promo",               // optional
///   "expiresAt": "2030-01-01T00:00:00Z"  // optional
/// }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "shortCode": "promo",
///   "shortUrl": "http://localhost:8080/promo",
///   "originalUrl": "https://example.com/page",
///   "createdAt": "2025-01-01T12:00:00Z",
///   "expiresAt": "2030-01-01T00:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// Returns 400 for a malformed body, an invalid URL or custom code, or a
/// custom code that is already taken.
pub async fn shorten_handler(
    State(state): State<AppState>,
    identity: ClientIdentity,
    headers: HeaderMap,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let link = state
        .link_service
        .create_short_link(CreateLink {
            destination: payload.original_url,
            custom_code: payload.custom_code,
            expires_at: payload.expires_at,
            owner_identity: identity.into_inner(),
        })
        .await?;

    let host = headers.get(header::HOST).and_then(|v| v.to_str().ok());
    let short_url = state.link_service.short_url(host, &link.code);

    tracing::info!(code = %link.code, custom = link.is_custom, "Short link created");

    Ok((
        StatusCode::CREATED,
        Json(ShortenResponse::from_link(link, short_url)),
    ))
}
