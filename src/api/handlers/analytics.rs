//! Handler for per-link analytics.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::analytics::AnalyticsResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns traffic analytics for a short link.
///
/// # Endpoint
///
/// `GET /api/v1/analytics/{code}`
///
/// # Response
///
/// ```json
/// {
///   "url": { "shortCode": "abc123", "originalUrl": "https://example.com", ... },
///   "totalClicks": 42,
///   "uniqueVisitors": 17,
///   "clicksByCountry": { "Germany": 20, "Local": 12 },
///   "clicksByDay": [{ "date": "2025-01-02", "clicks": 30 }],
///   "recentClicks": [ ... ]
/// }
/// ```
///
/// Expired links are still reported.
///
/// # Errors
///
/// Returns 404 Not Found if the code never existed.
pub async fn analytics_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let analytics = state.analytics_service.get_analytics(&code).await?;

    Ok(Json(analytics.into()))
}
