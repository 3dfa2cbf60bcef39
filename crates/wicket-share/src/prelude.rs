//! Prelude module - commonly used types for convenient import.
//!
//! Use `use wicket_share::prelude::*;` to import all essential types.
//!
//! # Example
//!
//! ```rust
//! use wicket_share::prelude::*;
//! use wicket_core::Timestamp;
//! use wicket_crypto::MacSecret;
//!
//! let service = ShareTokenService::new(MacSecret::generate());
//! let expires = Timestamp::now().plus_seconds(3600);
//! let token = service
//!     .create(ShareMode::Directory, "docs", expires, false)
//!     .unwrap();
//! let outcome = service.validate(&token, Timestamp::now());
//! assert!(outcome.context().is_some_and(|ctx| ctx.allows("/docs/report.pdf")));
//! ```

// Errors
pub use crate::{ShareError, ShareResult};

// Tokens
pub use crate::{
    DEFAULT_CLOCK_SKEW_SECS, ShareAccessContext, ShareMode, ShareTokenService, ValidationOutcome,
};

// One-time redemption
pub use crate::{OneTimeSession, RedemptionStore};
