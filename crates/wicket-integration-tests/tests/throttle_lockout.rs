//! Failure-rate throttling through the full gateway surface.

mod common;

use common::{at, basic_header, gateway_fixture, peer};
use wicket_core::GatewayRequest;

#[test]
fn five_failures_then_429_then_recovery() {
    let (_dir, gateway) = gateway_fixture();

    // five consecutive failed basic attempts within the window
    for _ in 0..5 {
        let req = GatewayRequest::new("GET", "/", peer())
            .with_header("Authorization", basic_header("admin:wrong"));
        let verdict = gateway.handle(&req, at(1_000));
        assert_eq!(verdict.denial.unwrap().status, 401);
    }

    // a sixth attempt within the same window: 429 with a numeric
    // Retry-After, even though the credentials are now correct
    let req = GatewayRequest::new("GET", "/", peer())
        .with_header("Authorization", basic_header("admin:hunter2"));
    let verdict = gateway.handle(&req, at(1_020));
    let denial = verdict.denial.unwrap();
    assert_eq!(denial.status, 429);
    let retry_after: u64 = denial
        .headers
        .iter()
        .find(|(name, _)| name == "Retry-After")
        .map(|(_, value)| value.parse().unwrap())
        .unwrap();
    assert_eq!(retry_after, 40);

    // after the window resets the same wrong credentials yield 401, not 429
    let req = GatewayRequest::new("GET", "/", peer())
        .with_header("Authorization", basic_header("admin:wrong"));
    assert_eq!(gateway.handle(&req, at(1_061)).denial.unwrap().status, 401);

    // and correct credentials go through again
    let req = GatewayRequest::new("GET", "/", peer())
        .with_header("Authorization", basic_header("admin:hunter2"));
    assert!(gateway.handle(&req, at(1_062)).authenticated);
}

#[test]
fn unauthenticated_page_loads_never_trip_the_throttle() {
    let (_dir, gateway) = gateway_fixture();

    // a browser hammering the challenge is not an attack
    for i in 0..20 {
        let req = GatewayRequest::new("GET", "/", peer());
        let verdict = gateway.handle(&req, at(1_000 + i));
        assert_eq!(verdict.denial.unwrap().status, 401);
    }
}

#[test]
fn other_clients_unaffected_by_a_lockout() {
    let (_dir, gateway) = gateway_fixture();

    for _ in 0..5 {
        let req = GatewayRequest::new("GET", "/", peer())
            .with_header("Authorization", basic_header("admin:wrong"));
        let _ = gateway.handle(&req, at(1_000));
    }

    let other_peer = "198.51.100.42".parse().unwrap();
    let req = GatewayRequest::new("GET", "/", other_peer)
        .with_header("Authorization", basic_header("admin:hunter2"));
    assert!(gateway.handle(&req, at(1_000)).authenticated);
}

#[test]
fn share_token_guessing_feeds_the_same_counter() {
    let (_dir, gateway) = gateway_fixture();

    // five bogus tokens from one client
    for i in 0..5 {
        let req = GatewayRequest::new("GET", "/docs/report.pdf", peer())
            .with_query(format!("token=guess{i}.guess"));
        let verdict = gateway.handle(&req, at(1_000));
        assert_eq!(verdict.denial.unwrap().status, 401);
    }

    // the sixth guess is throttled like any credential brute force
    let req = GatewayRequest::new("GET", "/docs/report.pdf", peer())
        .with_query("token=guess5.guess");
    assert_eq!(gateway.handle(&req, at(1_010)).denial.unwrap().status, 429);
}
