//! Shared fixtures for gateway integration tests.

// not every test binary uses every fixture
#![allow(dead_code)]

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::net::IpAddr;
use tempfile::TempDir;
use wicket_auth::Gateway;
use wicket_config::GatewayConfig;
use wicket_core::Timestamp;

/// Shared share-link secret for gateway fixtures.
pub const SHARE_SECRET: &[u8] = b"integration-test-secret";

/// A client address outside any trusted-proxy set.
pub fn peer() -> IpAddr {
    "203.0.113.7".parse().unwrap()
}

pub fn at(unix: i64) -> Timestamp {
    Timestamp::from_unix_seconds(unix).unwrap()
}

pub fn basic_header(creds: &str) -> String {
    format!("Basic {}", STANDARD.encode(creds))
}

/// A root with a shared directory, a private file, and a hidden dotfile,
/// fronted by a gateway with basic credentials and share links enabled.
pub fn gateway_fixture() -> (TempDir, Gateway) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("docs")).unwrap();
    std::fs::write(dir.path().join("docs/report.pdf"), b"pdf").unwrap();
    std::fs::write(dir.path().join("docs/style.css"), b"css").unwrap();
    std::fs::write(dir.path().join("private.txt"), b"private").unwrap();
    std::fs::write(dir.path().join(".env"), b"SECRET=1").unwrap();
    std::fs::write(dir.path().join("setup.exe"), b"bin").unwrap();

    let mut config = GatewayConfig::default();
    config.policy.root = dir.path().to_path_buf();
    config.policy.blocked_extensions = vec!["exe".to_string()];
    config.auth.basic_username = Some("admin".to_string());
    config.auth.basic_password = Some("hunter2".to_string());
    config.share.secret = Some(String::from_utf8(SHARE_SECRET.to_vec()).unwrap());

    let gateway = Gateway::from_config(&config).unwrap();
    (dir, gateway)
}
