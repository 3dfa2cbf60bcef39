//! Wicket Core - Foundation types for the Wicket request-authorization gateway.
//!
//! This crate provides:
//! - The gateway-facing view of an HTTP request ([`GatewayRequest`])
//! - Client identity resolution behind trusted proxies
//! - Timestamps and wire-facing identifiers
//! - The denial taxonomy shared by every trust mechanism

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod identity;
mod request;
mod types;

pub use identity::{ClientId, resolve_client_ip};
pub use request::GatewayRequest;
pub use types::{DenialClass, SessionId, Timestamp};
