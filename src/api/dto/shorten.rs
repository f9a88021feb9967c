//! DTOs for the link shortening endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::Link;

/// Request to shorten a single URL.
///
/// Field names are camelCase; the snake_case spellings are accepted too.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShortenRequest {
    /// The URL to shorten. Scheme and host are checked by the service.
    #[serde(alias = "original_url")]
    #[validate(length(min = 1, message = "originalUrl is required"))]
    pub original_url: String,

    /// Optional custom short code (3-20 letters or digits).
    #[serde(default, alias = "custom_code")]
    pub custom_code: Option<String>,

    /// Optional expiry timestamp (RFC 3339). After this time the link 404s.
    #[serde(default, alias = "expires_at")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Created short link.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenResponse {
    pub short_code: String,
    pub short_url: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl ShortenResponse {
    pub fn from_link(link: Link, short_url: String) -> Self {
        Self {
            short_code: link.code,
            short_url,
            original_url: link.destination,
            created_at: link.created_at,
            expires_at: link.expires_at,
        }
    }
}
