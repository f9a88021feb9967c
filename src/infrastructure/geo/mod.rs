//! Client geolocation for click analytics.
//!
//! Provides a [`GeoLocator`] trait with two implementations:
//! - [`IpApiLocator`] - Remote lookup with a hard timeout
//! - [`LocalOnlyLocator`] - Offline classification for disabled lookups

mod ip_api;
mod local_only;
mod locator;

pub use ip_api::{DEFAULT_API_URL, DEFAULT_TIMEOUT, IpApiLocator};
pub use local_only::LocalOnlyLocator;
pub use locator::{GeoInfo, GeoLocator, LOCAL, LOCAL_NETWORK, UNKNOWN, classify_local};

#[cfg(test)]
pub use locator::MockGeoLocator;
