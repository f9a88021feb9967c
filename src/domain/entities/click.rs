//! Click entity representing a single redirect event.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A recorded visit to a short link.
///
/// Click rows are append-only. `link_code` is a logical reference to
/// [`super::Link::code`]; the store does not enforce it.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Click {
    pub id: i64,
    #[serde(rename = "shortCode")]
    pub link_code: String,
    pub client_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub observed_at: DateTime<Utc>,
}

/// Input data for appending a click to the event log.
#[derive(Debug, Clone, PartialEq)]
pub struct NewClick {
    pub link_code: String,
    pub client_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub observed_at: DateTime<Utc>,
}
