//! # linktrack
//!
//! A URL shortener with expiring links, asynchronous click accounting and
//! per-link analytics, built with Axum and SQLite.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Entities, repository traits, rate limiter, click queue
//! - **Application Layer** ([`application`]) - Link, analytics and click recording services
//! - **Infrastructure Layer** ([`infrastructure`]) - SQLite store, Redis cache, geolocation
//! - **API Layer** ([`api`]) - REST handlers, DTOs and middleware
//!
//! ## Request Paths
//!
//! - `POST /api/v1/shorten` validates and stores a link
//! - `GET /{code}` answers `301` at once; the click is recorded by a
//!   background worker
//! - `GET /api/v1/analytics/{code}` aggregates the click log on every call
//!
//! ## Quick Start
//!
//! ```bash
//! export DATABASE_URL="sqlite://url_shortener.db?mode=rwc"
//! export REDIS_URL="redis://localhost:6379"  # Optional
//!
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Loaded from environment variables via [`config::Config`].

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{AnalyticsService, ClickRecorder, LinkService};
    pub use crate::domain::clock::{Clock, SystemClock};
    pub use crate::domain::entities::{Click, Link, NewClick, NewLink};
    pub use crate::error::AppError;
    pub use crate::state::AppState;
}
