//! DTOs for the analytics endpoint.

use serde::{Serialize, Serializer};

use crate::application::services::LinkAnalytics;
use crate::domain::entities::{Click, Link};
use crate::domain::repositories::{CountryClicks, DailyClicks};

/// Traffic report for one link.
///
/// `clicksByCountry` is a JSON object whose keys keep the ranking order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub url: Link,
    pub total_clicks: i64,
    pub unique_visitors: i64,
    #[serde(serialize_with = "serialize_country_map")]
    pub clicks_by_country: Vec<CountryClicks>,
    pub clicks_by_day: Vec<DailyClicks>,
    pub recent_clicks: Vec<Click>,
}

impl From<LinkAnalytics> for AnalyticsResponse {
    fn from(a: LinkAnalytics) -> Self {
        Self {
            url: a.link,
            total_clicks: a.total_clicks,
            unique_visitors: a.unique_visitors,
            clicks_by_country: a.clicks_by_country,
            clicks_by_day: a.clicks_by_day,
            recent_clicks: a.recent_clicks,
        }
    }
}

fn serialize_country_map<S>(rows: &[CountryClicks], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(rows.iter().map(|r| (&r.country, r.clicks)))
}
