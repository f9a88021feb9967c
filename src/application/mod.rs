//! Application layer services implementing business logic.
//!
//! Services coordinate repository calls, validation and business rules, and
//! give HTTP handlers a narrow API. They depend on repository traits only.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Short link creation and resolution
//! - [`services::analytics_service::AnalyticsService`] - Per-link traffic reports
//! - [`services::click_recorder::ClickRecorder`] - Click log and counter writes

pub mod services;
