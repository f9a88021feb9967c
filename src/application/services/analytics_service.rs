//! Analytics aggregation over the click log.

use std::sync::Arc;

use chrono::Duration;

use crate::domain::clock::Clock;
use crate::domain::entities::{Click, Link};
use crate::domain::repositories::{ClickRepository, CountryClicks, DailyClicks, LinkRepository};
use crate::error::AppError;

/// Countries returned in `clicks_by_country`.
pub const TOP_COUNTRIES_LIMIT: i64 = 10;

/// Clicks returned in `recent_clicks`.
pub const RECENT_CLICKS_LIMIT: i64 = 10;

/// Days covered by `clicks_by_day`, counted back from now.
pub const DAILY_WINDOW_DAYS: i64 = 30;

/// Aggregated traffic for one link.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkAnalytics {
    pub link: Link,
    pub total_clicks: i64,
    pub unique_visitors: i64,
    pub clicks_by_country: Vec<CountryClicks>,
    pub clicks_by_day: Vec<DailyClicks>,
    pub recent_clicks: Vec<Click>,
}

/// Computes link analytics from the click log on every call.
pub struct AnalyticsService<L: LinkRepository, C: ClickRepository> {
    link_repository: Arc<L>,
    click_repository: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<L: LinkRepository, C: ClickRepository> AnalyticsService<L, C> {
    pub fn new(link_repository: Arc<L>, click_repository: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self {
            link_repository,
            click_repository,
            clock,
        }
    }

    /// Builds the analytics report for `code`.
    ///
    /// Expired links are still reported.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::LinkNotFound`] if no link ever used `code`.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn get_analytics(&self, code: &str) -> Result<LinkAnalytics, AppError> {
        let link = self
            .link_repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::LinkNotFound {
                code: code.to_string(),
            })?;

        let since = self.clock.now() - Duration::days(DAILY_WINDOW_DAYS);

        let (total_clicks, unique_visitors, clicks_by_country, clicks_by_day, recent_clicks) = tokio::try_join!(
            self.click_repository.count_clicks(code),
            self.click_repository.count_unique_visitors(code),
            self.click_repository
                .clicks_by_country(code, TOP_COUNTRIES_LIMIT),
            self.click_repository.clicks_by_day(code, since),
            self.click_repository
                .recent_clicks(code, RECENT_CLICKS_LIMIT),
        )?;

        Ok(LinkAnalytics {
            link,
            total_clicks,
            unique_visitors,
            clicks_by_country,
            clicks_by_day,
            recent_clicks,
        })
    }
}
