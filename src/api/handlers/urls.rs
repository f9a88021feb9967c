//! Handler listing the caller's links.

use axum::{Json, extract::State};

use crate::domain::entities::Link;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::ClientIdentity;

/// Lists links created from the caller's address, newest first.
///
/// # Endpoint
///
/// `GET /api/v1/urls`
pub async fn urls_handler(
    State(state): State<AppState>,
    identity: ClientIdentity,
) -> Result<Json<Vec<Link>>, AppError> {
    let links = state.link_service.list_by_owner(identity.as_str()).await?;

    Ok(Json(links))
}
