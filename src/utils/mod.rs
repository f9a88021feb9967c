//! Helpers shared across layers.
//!
//! - [`code_generator`] - Short code generation and validation
//! - [`url_validator`] - Destination URL checks
//! - [`client_ip`] - Client identity extraction from requests

pub mod client_ip;
pub mod code_generator;
pub mod url_validator;
