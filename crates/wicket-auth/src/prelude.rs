//! Prelude module - commonly used types for convenient import.
//!
//! Use `use wicket_auth::prelude::*;` to import all essential types.

// Errors
pub use crate::{AuthError, AuthResult};

// Decision surface
pub use crate::{AuthDecision, Authenticator, SESSION_PARAM, TOKEN_PARAM};

// Facade
pub use crate::{DenialResponse, Gateway, GatewayVerdict};

// Throttling
pub use crate::{FailureThrottle, ThrottleDecision};

// Header parsing
pub use crate::{CredentialParseError, extract_bearer, parse_basic_authorization};
