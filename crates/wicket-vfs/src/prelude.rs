//! Prelude module - commonly used types for convenient import.
//!
//! Use `use wicket_vfs::prelude::*;` to import all essential types.

// Errors
pub use crate::{VfsError, VfsResult};

// Resolution
pub use crate::{Resolver, ScopeDecision, normalize_request_path};

// Policy
pub use crate::PolicyMatcher;
