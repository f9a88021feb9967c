//! Click accounting: geolocation, event log append and counter increment.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::infrastructure::geo::{GeoInfo, GeoLocator};

/// What happened to one click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickOutcome {
    /// The event was appended to the click log.
    pub logged: bool,
    /// The link's `click_count` was incremented.
    pub counted: bool,
}

/// Records redirects into the click log and the link counter.
///
/// The two writes are independent: a failure in one never prevents the other,
/// and nothing is retried. Failures are logged and counted in the
/// `clicks_failed_total` metric, so `click_count` and the log may drift apart.
pub struct ClickRecorder<C: ClickRepository, L: LinkRepository> {
    click_repository: Arc<C>,
    link_repository: Arc<L>,
    geo: Arc<dyn GeoLocator>,
    geo_timeout: Duration,
}

impl<C: ClickRepository, L: LinkRepository> ClickRecorder<C, L> {
    pub fn new(
        click_repository: Arc<C>,
        link_repository: Arc<L>,
        geo: Arc<dyn GeoLocator>,
        geo_timeout: Duration,
    ) -> Self {
        Self {
            click_repository,
            link_repository,
            geo,
            geo_timeout,
        }
    }

    /// Accounts for one redirect.
    ///
    /// Geolocation is bounded by the configured timeout and falls back to
    /// `Unknown`. Then the event is appended and the counter incremented.
    pub async fn record(&self, event: ClickEvent) -> ClickOutcome {
        let code = event.code.clone();
        let location = self.locate(event.client_address.as_deref()).await;

        let logged = match self
            .click_repository
            .record_click(event.into_new_click(location.country, location.city))
            .await
        {
            Ok(click) => {
                debug!(code = %code, click_id = click.id, "Click logged");
                true
            }
            Err(e) => {
                error!(code = %code, error = %e, "Failed to log click");
                metrics::counter!("clicks_failed_total", "step" => "log").increment(1);
                false
            }
        };

        let counted = match self.link_repository.increment_clicks(&code).await {
            Ok(()) => true,
            Err(e) => {
                error!(code = %code, error = %e, "Failed to increment click count");
                metrics::counter!("clicks_failed_total", "step" => "count").increment(1);
                false
            }
        };

        if logged && counted {
            metrics::counter!("clicks_recorded_total").increment(1);
        }

        ClickOutcome { logged, counted }
    }

    async fn locate(&self, client_address: Option<&str>) -> GeoInfo {
        let ip = client_address.unwrap_or_default();

        match tokio::time::timeout(self.geo_timeout, self.geo.locate(ip)).await {
            Ok(info) => info,
            Err(_) => {
                warn!(ip, "Geolocation timed out");
                GeoInfo::unknown()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Click;
    use crate::domain::repositories::{MockClickRepository, MockLinkRepository};
    use crate::error::AppError;
    use crate::infrastructure::geo::MockGeoLocator;
    use chrono::Utc;
    use serde_json::json;

    fn event(ip: Option<&str>) -> ClickEvent {
        ClickEvent::new(
            "abc123".to_string(),
            ip.map(str::to_string),
            Some("Mozilla/5.0"),
            None,
            Utc::now(),
        )
    }

    fn stored(click: crate::domain::entities::NewClick) -> Click {
        Click {
            id: 1,
            link_code: click.link_code,
            client_address: click.client_address,
            user_agent: click.user_agent,
            referrer: click.referrer,
            country: click.country,
            city: click.city,
            observed_at: click.observed_at,
        }
    }

    #[tokio::test]
    async fn test_record_logs_and_counts() {
        let mut clicks = MockClickRepository::new();
        let mut links = MockLinkRepository::new();
        let mut geo = MockGeoLocator::new();

        geo.expect_locate()
            .withf(|ip| ip == "8.8.8.8")
            .times(1)
            .returning(|_| GeoInfo::new("United States", "Mountain View"));

        clicks
            .expect_record_click()
            .withf(|c| {
                c.link_code == "abc123"
                    && c.country.as_deref() == Some("United States")
                    && c.city.as_deref() == Some("Mountain View")
            })
            .times(1)
            .returning(|c| Ok(stored(c)));

        links
            .expect_increment_clicks()
            .withf(|code| code == "abc123")
            .times(1)
            .returning(|_| Ok(()));

        let recorder = ClickRecorder::new(
            Arc::new(clicks),
            Arc::new(links),
            Arc::new(geo),
            Duration::from_secs(2),
        );

        let outcome = recorder.record(event(Some("8.8.8.8"))).await;

        assert_eq!(
            outcome,
            ClickOutcome {
                logged: true,
                counted: true
            }
        );
    }

    #[tokio::test]
    async fn test_log_failure_still_counts() {
        let mut clicks = MockClickRepository::new();
        let mut links = MockLinkRepository::new();
        let mut geo = MockGeoLocator::new();

        geo.expect_locate().returning(|_| GeoInfo::unknown());
        clicks
            .expect_record_click()
            .times(1)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));
        links
            .expect_increment_clicks()
            .times(1)
            .returning(|_| Ok(()));

        let recorder = ClickRecorder::new(
            Arc::new(clicks),
            Arc::new(links),
            Arc::new(geo),
            Duration::from_secs(2),
        );

        let outcome = recorder.record(event(None)).await;

        assert!(!outcome.logged);
        assert!(outcome.counted);
    }

    #[tokio::test]
    async fn test_count_failure_still_logs() {
        let mut clicks = MockClickRepository::new();
        let mut links = MockLinkRepository::new();
        let mut geo = MockGeoLocator::new();

        geo.expect_locate().returning(|_| GeoInfo::local());
        clicks
            .expect_record_click()
            .times(1)
            .returning(|c| Ok(stored(c)));
        links
            .expect_increment_clicks()
            .times(1)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let recorder = ClickRecorder::new(
            Arc::new(clicks),
            Arc::new(links),
            Arc::new(geo),
            Duration::from_secs(2),
        );

        let outcome = recorder.record(event(Some("127.0.0.1"))).await;

        assert!(outcome.logged);
        assert!(!outcome.counted);
    }

    struct SlowLocator;

    #[async_trait::async_trait]
    impl GeoLocator for SlowLocator {
        async fn locate(&self, _ip: &str) -> GeoInfo {
            tokio::time::sleep(Duration::from_secs(10)).await;
            GeoInfo::new("Too", "Late")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_geolocation_timeout_degrades_to_unknown() {
        let mut clicks = MockClickRepository::new();
        let mut links = MockLinkRepository::new();

        clicks
            .expect_record_click()
            .withf(|c| c.country.as_deref() == Some("Unknown") && c.city.as_deref() == Some("Unknown"))
            .times(1)
            .returning(|c| Ok(stored(c)));
        links.expect_increment_clicks().returning(|_| Ok(()));

        let recorder = ClickRecorder::new(
            Arc::new(clicks),
            Arc::new(links),
            Arc::new(SlowLocator),
            Duration::from_secs(2),
        );

        let outcome = recorder.record(event(Some("8.8.8.8"))).await;

        assert!(outcome.logged && outcome.counted);
    }
}
