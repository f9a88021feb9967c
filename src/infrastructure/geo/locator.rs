//! Geolocation trait, result type and local-address classification.

use async_trait::async_trait;
use std::net::IpAddr;

pub const UNKNOWN: &str = "Unknown";
pub const LOCAL: &str = "Local";
pub const LOCAL_NETWORK: &str = "Local Network";

/// Country and city for a client address.
///
/// Lookups never fail: unresolvable addresses map to [`GeoInfo::unknown`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoInfo {
    pub country: String,
    pub city: String,
}

impl GeoInfo {
    pub fn new(country: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            city: city.into(),
        }
    }

    pub fn unknown() -> Self {
        Self::new(UNKNOWN, UNKNOWN)
    }

    pub fn local() -> Self {
        Self::new(LOCAL, LOCAL)
    }

    pub fn local_network() -> Self {
        Self::new(LOCAL_NETWORK, LOCAL_NETWORK)
    }
}

/// Resolves a client address to a location.
///
/// # Implementations
///
/// - [`crate::infrastructure::geo::IpApiLocator`] - HTTP lookup against an ip-api style service
/// - [`crate::infrastructure::geo::LocalOnlyLocator`] - Classification only, no network access
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeoLocator: Send + Sync {
    /// Looks up `ip`. Implementations must return within their own timeout
    /// and report failures as [`GeoInfo::unknown`].
    async fn locate(&self, ip: &str) -> GeoInfo;
}

/// Classifies addresses that never need a remote lookup.
///
/// - empty, `localhost` and loopback addresses are `Local`
/// - private, link-local and unique-local addresses are `Local Network`
///
/// Returns `None` for anything else, including text that is not an address.
pub fn classify_local(ip: &str) -> Option<GeoInfo> {
    let ip = ip.trim();
    if ip.is_empty() || ip.eq_ignore_ascii_case("localhost") {
        return Some(GeoInfo::local());
    }

    // "::ffff:10.0.0.1" is an IPv4 address in IPv6 clothing.
    let parsed = match ip.parse::<IpAddr>().ok()? {
        IpAddr::V6(v6) => v6
            .to_ipv4_mapped()
            .map(IpAddr::V4)
            .unwrap_or(IpAddr::V6(v6)),
        v4 => v4,
    };

    match parsed {
        IpAddr::V4(addr) if addr.is_loopback() || addr.is_unspecified() => Some(GeoInfo::local()),
        IpAddr::V4(addr) if addr.is_private() || addr.is_link_local() => {
            Some(GeoInfo::local_network())
        }
        IpAddr::V6(addr) if addr.is_loopback() || addr.is_unspecified() => Some(GeoInfo::local()),
        IpAddr::V6(addr) => {
            let first = addr.segments()[0];
            // fe80::/10 link-local, fc00::/7 unique-local
            if (first & 0xffc0) == 0xfe80 || (first & 0xfe00) == 0xfc00 {
                Some(GeoInfo::local_network())
            } else {
                None
            }
        }
        IpAddr::V4(_) => None,
    }
}
