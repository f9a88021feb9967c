//! Client identity resolution from request headers and the peer address.

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{HeaderMap, request::Parts};
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

/// Identity used when no header or peer address is available.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Address-derived identity of the caller.
///
/// Used as the rate-limit key, as the owner of created links and as the
/// client address recorded with each click.
///
/// Resolution order:
/// 1. first entry of `X-Forwarded-For`
/// 2. `X-Real-IP`
/// 3. transport peer address from [`ConnectInfo`]
///
/// Each candidate is reduced to its host part, so `[::1]:8080` becomes `::1`
/// and `198.51.100.4:5000` becomes `198.51.100.4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity(pub String);

impl ClientIdentity {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Resolves the identity from headers, falling back to `peer`.
    pub fn resolve(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        let forwarded = header_str(headers, "x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let real_ip = header_str(headers, "x-real-ip")
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let identity = forwarded
            .or(real_ip)
            .map(host_from_addr)
            .or_else(|| peer.map(|addr| addr.ip().to_string()))
            .unwrap_or_else(|| UNKNOWN_CLIENT.to_string());

        Self(identity)
    }
}

impl std::fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<S> FromRequestParts<S> for ClientIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(Self::resolve(&parts.headers, peer))
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Strips an optional port from an address, keeping bare IPv6 intact.
///
/// - `[2001:db8::1]:443` and `[2001:db8::1]` give `2001:db8::1`
/// - `203.0.113.9:8080` gives `203.0.113.9`
/// - `2001:db8::1` is returned unchanged
pub fn host_from_addr(addr: &str) -> String {
    let addr = addr.trim();

    if let Some(rest) = addr.strip_prefix('[') {
        return match rest.find(']') {
            Some(end) => rest[..end].to_string(),
            None => rest.to_string(),
        };
    }

    if addr.parse::<IpAddr>().is_ok() {
        return addr.to_string();
    }

    match addr.rsplit_once(':') {
        // A single colon means host:port; more than one is unbracketed IPv6.
        Some((host, _port)) if !host.contains(':') => host.to_string(),
        _ => addr.to_string(),
    }
}
