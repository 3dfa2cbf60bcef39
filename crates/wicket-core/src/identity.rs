//! Client identity resolution.
//!
//! Failure counters and security logs key on the client IP address as it
//! stands *after* trusted-proxy resolution: a forwarded-for chain is only
//! believed when the immediate peer is one of the configured proxies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// The identity a client is throttled and logged under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(pub IpAddr);

impl ClientId {
    /// The underlying address.
    #[must_use]
    pub fn addr(&self) -> IpAddr {
        self.0
    }
}

impl From<IpAddr> for ClientId {
    fn from(addr: IpAddr) -> Self {
        Self(addr)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolve the effective client address behind trusted proxies.
///
/// When the immediate peer is not a trusted proxy the forwarded-for header
/// is ignored outright - anyone can send one. When it is trusted, the
/// chain is walked right to left and the first entry that is not itself a
/// trusted proxy wins. An unparseable entry stops the walk; the gateway
/// never guesses an identity from garbage.
#[must_use]
pub fn resolve_client_ip(
    peer: IpAddr,
    forwarded_for: Option<&str>,
    trusted_proxies: &[IpAddr],
) -> IpAddr {
    if !trusted_proxies.contains(&peer) {
        return peer;
    }

    let Some(chain) = forwarded_for else {
        return peer;
    };

    let mut resolved = peer;
    for entry in chain.rsplit(',') {
        let Ok(addr) = entry.trim().parse::<IpAddr>() else {
            break;
        };
        resolved = addr;
        if !trusted_proxies.contains(&addr) {
            break;
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_untrusted_peer_ignores_forwarded_for() {
        let client = resolve_client_ip(
            ip("203.0.113.7"),
            Some("198.51.100.1"),
            &[ip("10.0.0.1")],
        );
        assert_eq!(client, ip("203.0.113.7"));
    }

    #[test]
    fn test_trusted_peer_uses_forwarded_for() {
        let client = resolve_client_ip(
            ip("10.0.0.1"),
            Some("198.51.100.1"),
            &[ip("10.0.0.1")],
        );
        assert_eq!(client, ip("198.51.100.1"));
    }

    #[test]
    fn test_chain_skips_intermediate_trusted_proxies() {
        let proxies = [ip("10.0.0.1"), ip("10.0.0.2")];
        let client = resolve_client_ip(
            ip("10.0.0.1"),
            Some("198.51.100.1, 10.0.0.2"),
            &proxies,
        );
        assert_eq!(client, ip("198.51.100.1"));
    }

    #[test]
    fn test_garbage_entry_stops_walk() {
        let client = resolve_client_ip(
            ip("10.0.0.1"),
            Some("not-an-ip, 10.0.0.1"),
            &[ip("10.0.0.1")],
        );
        // the walk consumed the trusted hop, then refused to trust garbage
        assert_eq!(client, ip("10.0.0.1"));
    }

    #[test]
    fn test_missing_header_falls_back_to_peer() {
        let peer = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(resolve_client_ip(peer, None, &[peer]), peer);
    }
}
