//! Prelude module - commonly used types for convenient import.
//!
//! Use `use wicket_core::prelude::*;` to import all essential types.
//!
//! # Example
//!
//! ```rust
//! use wicket_core::prelude::*;
//! use std::net::{IpAddr, Ipv4Addr};
//!
//! let peer = IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7));
//! let req = GatewayRequest::new("GET", "/docs/report.pdf", peer)
//!     .with_query("token=abc.def");
//! assert_eq!(req.query_param("token").as_deref(), Some("abc.def"));
//! ```

// Request view
pub use crate::GatewayRequest;

// Identity
pub use crate::{ClientId, resolve_client_ip};

// Common types
pub use crate::{DenialClass, SessionId, Timestamp};
