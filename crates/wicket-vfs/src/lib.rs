//! Wicket VFS - Root-contained path resolution and visibility policy.
//!
//! Every filesystem touch in the file browser goes through this crate
//! first. A request path is normalized lexically, joined onto a fixed
//! root, and canonicalized; the canonical result must still live under
//! the canonical root. A symlink inside the root that points outside it
//! fails that check even though the uncanonicalized path would pass a
//! string-prefix test.
//!
//! All checks here are pure and side-effect-free. Any ambiguous result
//! resolves to deny.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod path;
mod policy;

pub use error::{VfsError, VfsResult};
pub use path::{Resolver, ScopeDecision, normalize_request_path};
pub use policy::PolicyMatcher;
