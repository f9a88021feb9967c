//! Shared application state injected into every handler.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::services::{AnalyticsService, LinkService};
use crate::domain::click_event::ClickEvent;
use crate::domain::clock::Clock;
use crate::domain::rate_limiter::RateLimiter;
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::persistence::{SqliteClickRepository, SqliteLinkRepository};

pub type AppLinkService = LinkService<SqliteLinkRepository>;
pub type AppAnalyticsService = AnalyticsService<SqliteLinkRepository, SqliteClickRepository>;

/// Everything a request handler needs.
///
/// Cheap to clone: every field is reference-counted or a channel handle.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<AppLinkService>,
    pub analytics_service: Arc<AppAnalyticsService>,
    pub rate_limiter: Arc<RateLimiter>,
    pub cache: Arc<dyn CacheService>,
    pub click_sender: mpsc::Sender<ClickEvent>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Wires services over the given repositories.
    pub fn new(
        link_repository: Arc<SqliteLinkRepository>,
        click_repository: Arc<SqliteClickRepository>,
        cache: Arc<dyn CacheService>,
        clock: Arc<dyn Clock>,
        rate_limiter: Arc<RateLimiter>,
        click_sender: mpsc::Sender<ClickEvent>,
        base_url: Option<String>,
    ) -> Self {
        let link_service = LinkService::new(link_repository.clone(), cache.clone(), clock.clone())
            .with_base_url(base_url);
        let analytics_service =
            AnalyticsService::new(link_repository, click_repository, clock.clone());

        Self {
            link_service: Arc::new(link_service),
            analytics_service: Arc::new(analytics_service),
            rate_limiter,
            cache,
            click_sender,
            clock,
        }
    }
}
