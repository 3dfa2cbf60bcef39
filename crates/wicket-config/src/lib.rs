//! Wicket Config - Gateway configuration types and validation.
//!
//! The embedding server owns config file discovery and layering; this
//! crate defines the shape of the `[gateway]` tree, production-safe
//! defaults, and the validation pass that runs after deserialization.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod types;
mod validate;

pub use error::{ConfigError, ConfigResult};
pub use types::{
    AuthSection, GatewayConfig, PolicySection, ShareSection, SigV4Section, ThrottleSection,
};
pub use validate::validate;
