//! Source address extraction
//!
//! The recorded `SourceAddress` is the socket peer (`ip:port`). Forwarding
//! headers are consulted only when the service is configured to sit behind
//! trusted proxies; otherwise they are attacker controlled and ignored.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::state::AppState;

const UNKNOWN_ADDRESS: &str = "unknown";

/// Address of the uploading client, as stored in the object metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAddress(pub String);

impl FromRequestParts<Arc<AppState>> for SourceAddress {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(SourceAddress(resolve_source_address(
            &parts.headers,
            peer.as_ref(),
            state.upload.trusted_proxy_count,
        )))
    }
}

/// Resolve the client address for a request.
///
/// # Arguments
/// * `headers` - HTTP request headers
/// * `peer` - Socket address of the connection, if known
/// * `trusted_proxy_count` - Number of trusted proxies in front of the service (0 = none)
pub fn resolve_source_address(
    headers: &HeaderMap,
    peer: Option<&SocketAddr>,
    trusted_proxy_count: usize,
) -> String {
    if trusted_proxy_count > 0 {
        if let Some(ip) = headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| extract_from_forwarded_for(value, trusted_proxy_count))
        {
            return ip;
        }

        // Single IP set by some proxies
        if let Some(ip) = headers
            .get("x-real-ip")
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| is_valid_ip(value))
        {
            return ip.to_string();
        }
    }

    match peer {
        Some(addr) => addr.to_string(),
        None => UNKNOWN_ADDRESS.to_string(),
    }
}

/// Pick the client entry from an `X-Forwarded-For` chain.
///
/// Each proxy appends the address it received the request from, so with N
/// trusted proxies the client is the Nth entry from the right. Entries to the
/// left of it were supplied by the client and are not trusted.
fn extract_from_forwarded_for(header_value: &str, trusted_proxy_count: usize) -> Option<String> {
    let ips: Vec<&str> = header_value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    let position = ips.len().checked_sub(trusted_proxy_count)?;
    let client_ip = ips.get(position)?;

    if is_valid_ip(client_ip) {
        Some(client_ip.to_string())
    } else {
        None
    }
}

fn is_valid_ip(ip_str: &str) -> bool {
    ip_str.parse::<IpAddr>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> SocketAddr {
        "203.0.113.7:51234".parse().unwrap()
    }

    fn create_headers_with_xff(xff_value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_str(xff_value).unwrap());
        headers
    }

    #[test]
    fn test_peer_address_keeps_port() {
        let headers = HeaderMap::new();
        assert_eq!(
            resolve_source_address(&headers, Some(&peer()), 0),
            "203.0.113.7:51234"
        );
    }

    #[test]
    fn test_forwarded_for_ignored_without_trusted_proxies() {
        let headers = create_headers_with_xff("1.2.3.4");
        assert_eq!(
            resolve_source_address(&headers, Some(&peer()), 0),
            "203.0.113.7:51234"
        );
    }

    #[test]
    fn test_forwarded_for_single_proxy() {
        // Client -> Proxy -> Server; proxy appends the client
        let headers = create_headers_with_xff("198.51.100.1");
        assert_eq!(
            resolve_source_address(&headers, Some(&peer()), 1),
            "198.51.100.1"
        );
    }

    #[test]
    fn test_forwarded_for_spoofed_prefix_is_skipped() {
        // Client sends a forged entry; the trusted proxy appends the real address
        assert_eq!(
            extract_from_forwarded_for("6.6.6.6, 198.51.100.1", 1),
            Some("198.51.100.1".to_string())
        );
    }

    #[test]
    fn test_forwarded_for_multiple_proxies() {
        // Client -> LB -> Proxy -> Server
        assert_eq!(
            extract_from_forwarded_for("198.51.100.1, 10.0.0.1", 2),
            Some("198.51.100.1".to_string())
        );
    }

    #[test]
    fn test_forwarded_for_chain_too_short() {
        assert_eq!(extract_from_forwarded_for("198.51.100.1", 2), None);
    }

    #[test]
    fn test_forwarded_for_invalid_entry() {
        assert_eq!(extract_from_forwarded_for("not-an-ip", 1), None);
        assert_eq!(extract_from_forwarded_for("", 1), None);
    }

    #[test]
    fn test_ipv6_forwarded_for() {
        assert_eq!(
            extract_from_forwarded_for("2001:db8::1", 1),
            Some("2001:db8::1".to_string())
        );
    }

    #[test]
    fn test_real_ip_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static(" 198.51.100.9 "));
        assert_eq!(
            resolve_source_address(&headers, Some(&peer()), 1),
            "198.51.100.9"
        );
    }

    #[test]
    fn test_invalid_headers_fall_back_to_peer() {
        let mut headers = create_headers_with_xff("garbage");
        headers.insert("x-real-ip", HeaderValue::from_static("also-garbage"));
        assert_eq!(
            resolve_source_address(&headers, Some(&peer()), 1),
            "203.0.113.7:51234"
        );
    }

    #[test]
    fn test_unknown_without_peer() {
        assert_eq!(resolve_source_address(&HeaderMap::new(), None, 0), "unknown");
    }
}
