//! REST API layer for HTTP request/response handling.
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for request/response serialization
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Rate limiting, security headers and tracing
//! - [`routes`] - Versioned API route table

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
