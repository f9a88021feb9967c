//! Domain layer containing business entities and logic.
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`clock`] - Injectable time source
//! - [`rate_limiter`] - Per-client fixed-window admission control
//! - [`click_event`] - Click accounting event model
//! - [`click_worker`] - Asynchronous click processing worker
//!
//! # Click Processing Flow
//!
//! 1. The redirect handler resolves the link and answers immediately
//! 2. A [`click_event::ClickEvent`] is pushed onto a bounded channel
//! 3. [`click_worker::run_click_worker`] takes it off the queue
//! 4. [`crate::application::services::ClickRecorder`] geolocates, logs and counts it

pub mod click_event;
pub mod click_worker;
pub mod clock;
pub mod entities;
pub mod rate_limiter;
pub mod repositories;
