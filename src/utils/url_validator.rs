//! Destination URL validation.
//!
//! Destinations are stored exactly as submitted; validation only rejects
//! input that could not be redirected to.

use url::Url;

/// Reasons a destination URL is refused.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("URL must start with http:// or https://")]
    UnsupportedScheme,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("URL must include a host")]
    MissingHost,
}

/// Checks that `input` is an absolute `http`/`https` URL with a host.
///
/// # Errors
///
/// Returns [`UrlValidationError::UnsupportedScheme`] when the text does not
/// start with `http://` or `https://`, and the other variants when the URL
/// cannot be parsed or has an empty host.
///
/// # Examples
///
/// ```ignore
/// assert!(validate_destination("https://example.com/a?b=c").is_ok());
/// assert!(validate_destination("ftp://example.com").is_err());
/// ```
pub fn validate_destination(input: &str) -> Result<(), UrlValidationError> {
    if !input.starts_with("http://") && !input.starts_with("https://") {
        return Err(UrlValidationError::UnsupportedScheme);
    }

    let url = Url::parse(input).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(UrlValidationError::MissingHost),
    }
}
