//! Geolocation through an ip-api.com compatible HTTP service.

use async_trait::async_trait;
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;
use tracing::debug;

use super::locator::{GeoInfo, GeoLocator, UNKNOWN, classify_local};

pub const DEFAULT_API_URL: &str = "http://ip-api.com/json/{ip}";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Deserialize)]
struct IpApiResponse {
    status: String,
    country: Option<String>,
    city: Option<String>,
}

/// Locator that asks a remote service for public addresses.
///
/// `api_url_template` uses `{ip}` as the placeholder, for example
/// `http://ip-api.com/json/{ip}`. Every request is bounded by the client
/// timeout; transport errors, timeouts, unparseable bodies and non-`success`
/// answers all degrade to `Unknown`.
pub struct IpApiLocator {
    client: reqwest::Client,
    api_url_template: String,
}

impl IpApiLocator {
    /// Builds a locator with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(api_url_template: &str, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_url_template: api_url_template.to_string(),
        })
    }

    async fn fetch(&self, ip: &str) -> Option<GeoInfo> {
        let url = self.api_url_template.replace("{ip}", ip);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| debug!("geo lookup network error for {}: {}", ip, e))
            .ok()?;

        let body: IpApiResponse = resp
            .json()
            .await
            .map_err(|e| debug!("geo lookup parse error for {}: {}", ip, e))
            .ok()?;

        if body.status != "success" {
            debug!("geo lookup returned status '{}' for {}", body.status, ip);
            return None;
        }

        let or_unknown = |v: Option<String>| {
            v.filter(|s| !s.is_empty())
                .unwrap_or_else(|| UNKNOWN.to_string())
        };

        Some(GeoInfo {
            country: or_unknown(body.country),
            city: or_unknown(body.city),
        })
    }
}

#[async_trait]
impl GeoLocator for IpApiLocator {
    async fn locate(&self, ip: &str) -> GeoInfo {
        if let Some(local) = classify_local(ip) {
            return local;
        }

        if ip.trim().parse::<IpAddr>().is_err() {
            return GeoInfo::unknown();
        }

        self.fetch(ip.trim()).await.unwrap_or_else(GeoInfo::unknown)
    }
}
