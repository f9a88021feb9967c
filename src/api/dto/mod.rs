//! Data Transfer Objects for API requests and responses.
//!
//! JSON bodies use camelCase field names. Request DTOs are checked with
//! `validator` before reaching the services.

pub mod analytics;
pub mod health;
pub mod shorten;
