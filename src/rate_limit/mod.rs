//! # Token Bucket Registry
//!
//! Per-identity admission control in front of the use-case layer. Each caller
//! identity (authenticated user id when present, client address otherwise)
//! gets an independent continuously-refilling token bucket; the boundary asks
//! [`RateLimiterRegistry::allow`] once per inbound request and returns a
//! throttling response on `false` without doing any further work.

pub mod bucket;
pub mod registry;

pub use bucket::TokenBucket;
pub use registry::RateLimiterRegistry;

use std::net::SocketAddr;

/// Identity key for one inbound request: the authenticated user when known,
/// otherwise the client address.
pub fn request_identity(
    user_id: Option<i64>,
    remote_addr: &str,
    forwarded_for: Option<&str>,
) -> String {
    if let Some(id) = user_id {
        return format!("user_id:{}", id);
    }

    format!("ip:{}", client_ip(remote_addr, forwarded_for))
}

/// First non-empty hop of X-Forwarded-For when present, else the remote
/// address with any port stripped.
fn client_ip(remote_addr: &str, forwarded_for: Option<&str>) -> String {
    if let Some(forwarded) = forwarded_for {
        for part in forwarded.split(',') {
            let ip = part.trim();
            if !ip.is_empty() {
                return ip.to_string();
            }
        }
    }

    match remote_addr.parse::<SocketAddr>() {
        Ok(addr) => addr.ip().to_string(),
        Err(_) => remote_addr.to_string(),
    }
}
