//! Client identity extraction.

use std::net::IpAddr;

use axum::http::HeaderMap;

use crate::config::RateLimitConfig;

/// Identity used when neither headers nor the transport yield an address.
pub const UNKNOWN_IDENTITY: &str = "unknown";

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Derive the string that keys rate limit state for a request.
///
/// Forwarding headers are consulted only when `trust_proxy` is set: the first
/// `X-Forwarded-For` hop, then `X-Real-IP`, then the peer address. Values are
/// taken verbatim after trimming, with no address syntax check, so they are
/// spoofable unless the edge proxy overwrites them.
///
/// A header that is blank after trimming counts as absent and falls through
/// to the next source rather than keying state on an empty identity. Values
/// that are not visible ASCII fail `to_str` and are skipped the same way.
pub fn extract_identity(headers: &HeaderMap, peer: Option<IpAddr>, config: &RateLimitConfig) -> String {
    if config.trust_proxy {
        if let Some(forwarded) = first_forwarded_hop(headers) {
            return forwarded;
        }
        if let Some(real_ip) = header_value(headers, X_REAL_IP) {
            return real_ip.to_string();
        }
    }

    peer.map(|ip| ip.to_string())
        .unwrap_or_else(|| UNKNOWN_IDENTITY.to_string())
}

fn first_forwarded_hop(headers: &HeaderMap) -> Option<String> {
    headers
        .get(X_FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .map(ToOwned::to_owned)
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
