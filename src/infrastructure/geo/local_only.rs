//! Geolocation without remote lookups.

use async_trait::async_trait;

use super::locator::{GeoInfo, GeoLocator, classify_local};

/// Locator used when remote geolocation is disabled.
///
/// Local and private addresses are still classified; everything else is
/// reported as `Unknown`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalOnlyLocator;

impl LocalOnlyLocator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl GeoLocator for LocalOnlyLocator {
    async fn locate(&self, ip: &str) -> GeoInfo {
        classify_local(ip).unwrap_or_else(GeoInfo::unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_public_address_is_unknown() {
        assert_eq!(LocalOnlyLocator.locate("8.8.8.8").await, GeoInfo::unknown());
    }

    #[tokio::test]
    async fn test_private_address_is_classified() {
        assert_eq!(
            LocalOnlyLocator.locate("192.168.0.3").await,
            GeoInfo::local_network()
        );
    }
}
