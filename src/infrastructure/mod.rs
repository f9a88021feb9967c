//! Infrastructure layer for external integrations.
//!
//! # Modules
//!
//! - [`cache`] - Redirect cache (Redis and no-op implementations)
//! - [`geo`] - Client geolocation
//! - [`persistence`] - SQLite repository implementations

pub mod cache;
pub mod geo;
pub mod persistence;
