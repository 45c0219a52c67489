//! Client identification utilities
//!
//! Rate limiting is keyed by a client identity derived from request
//! headers and the peer address.

use axum::http::HeaderMap;
use std::net::IpAddr;

/// Identity used when no address can be determined.
///
/// All such requests share one bucket, which errs on the side of limiting.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Extract client IP address from headers
///
/// Checks X-Forwarded-For (first hop) and X-Real-IP for reverse proxy
/// setups, then falls back to the direct connection IP.
///
/// ## Arguments
/// * `headers` - HTTP request headers
/// * `direct_ip` - Direct connection IP address
///
/// ## Returns
/// The client IP address, or None if not determinable
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    if let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first_ip) = xff.split(',').next() {
            if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                return Some(ip);
            }
        }
    }
    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        if let Ok(ip) = real_ip.trim().parse::<IpAddr>() {
            return Some(ip);
        }
    }
    direct_ip
}

/// Client identity string used as the rate-limit key prefix
pub fn client_id(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> String {
    extract_client_ip(headers, direct_ip)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
