//! Repository trait for the click event log and its aggregations.

use crate::domain::entities::{Click, NewClick};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Click total for one country.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CountryClicks {
    pub country: String,
    pub clicks: i64,
}

/// Click total for one UTC calendar day, formatted `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct DailyClicks {
    pub date: String,
    pub clicks: i64,
}

/// Repository interface for the append-only click log.
///
/// Aggregations are computed from the log on every call.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::SqliteClickRepository`] - SQLite implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Appends a click to the log.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn record_click(&self, click: NewClick) -> Result<Click, AppError>;

    /// Number of clicks logged for `code`.
    async fn count_clicks(&self, code: &str) -> Result<i64, AppError>;

    /// Number of distinct, non-null client addresses logged for `code`.
    async fn count_unique_visitors(&self, code: &str) -> Result<i64, AppError>;

    /// Click totals per country, highest first (ties by country name),
    /// at most `limit` rows. Clicks without a country are skipped.
    async fn clicks_by_country(&self, code: &str, limit: i64)
    -> Result<Vec<CountryClicks>, AppError>;

    /// Click totals per UTC day for clicks observed at or after `since`,
    /// most recent day first.
    async fn clicks_by_day(
        &self,
        code: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<DailyClicks>, AppError>;

    /// The `limit` most recent clicks, newest first.
    async fn recent_clicks(&self, code: &str, limit: i64) -> Result<Vec<Click>, AppError>;
}
