//! Business logic services for the application layer.

pub mod analytics_service;
pub mod click_recorder;
pub mod link_service;

pub use analytics_service::{AnalyticsService, LinkAnalytics};
pub use click_recorder::{ClickOutcome, ClickRecorder};
pub use link_service::{CreateLink, LinkService};
