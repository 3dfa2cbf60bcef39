//! Request-path normalization and root-contained resolution.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{VfsError, VfsResult};
use crate::policy::PolicyMatcher;

/// Lexically normalize a logical request path.
///
/// Strips the leading slash, drops empty segments, and rejects `.` and
/// `..` segments textually before anything touches the filesystem.
/// Backslashes and NUL bytes are rejected outright; neither has any
/// business in a request path and both have a history as separator
/// smuggling vectors.
///
/// Returns the normalized relative path (possibly empty, meaning the
/// root itself), or `None` if the path must be denied.
#[must_use]
pub fn normalize_request_path(raw: &str) -> Option<String> {
    let mut segments = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" => continue,
            "." | ".." => return None,
            s if s.contains('\\') || s.contains('\0') => return None,
            s => segments.push(s),
        }
    }
    Some(segments.join("/"))
}

/// Outcome of resolving one request path against root and policy.
///
/// Derived per request and never cached; the filesystem is authoritative.
#[derive(Debug, Clone)]
pub struct ScopeDecision {
    /// Canonical physical path, or `None` when containment failed.
    /// Callers treat `None` as 403, not 404.
    pub physical_path: Option<PathBuf>,
    /// The normalized relative path the decision was made for.
    pub relative_path: String,
    /// Entry is hidden by the configured pattern set or dotfile rule.
    pub hidden: bool,
    /// Download of this entry is refused by extension policy.
    pub download_blocked: bool,
}

/// Maps request paths to canonical, root-contained filesystem paths.
#[derive(Debug, Clone)]
pub struct Resolver {
    canonical_root: PathBuf,
}

impl Resolver {
    /// Create a resolver over a fixed root directory.
    ///
    /// The root is canonicalized once here; every later containment check
    /// compares against this canonical form.
    ///
    /// # Errors
    ///
    /// Returns [`VfsError::RootUnavailable`] if the root does not exist or
    /// cannot be canonicalized.
    pub fn new(root: impl Into<PathBuf>) -> VfsResult<Self> {
        let root = root.into();
        let canonical_root =
            std::fs::canonicalize(&root).map_err(|e| VfsError::RootUnavailable {
                root: root.clone(),
                message: e.to_string(),
            })?;
        Ok(Self { canonical_root })
    }

    /// The canonical root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.canonical_root
    }

    /// Resolve a logical request path to a canonical physical path.
    ///
    /// Returns `None` on any traversal or symlink-escape detection, never
    /// a partial path. A `None` here is a security-relevant rejection and
    /// is logged as such; ordinary not-found is not an escape and does
    /// not reject (the nonexistent tail is appended to its canonicalized
    /// ancestor so the caller can produce its own 404).
    #[must_use]
    pub fn resolve(&self, request_path: &str) -> Option<PathBuf> {
        let Some(rel) = normalize_request_path(request_path) else {
            warn!(path = %request_path, "rejected traversal in request path");
            return None;
        };
        self.resolve_normalized(&rel)
    }

    /// Resolve a path plus policy verdicts in one pass.
    #[must_use]
    pub fn resolve_scope(&self, request_path: &str, policy: &PolicyMatcher) -> ScopeDecision {
        let Some(rel) = normalize_request_path(request_path) else {
            warn!(path = %request_path, "rejected traversal in request path");
            return ScopeDecision {
                physical_path: None,
                relative_path: String::new(),
                hidden: false,
                download_blocked: false,
            };
        };
        let physical_path = self.resolve_normalized(&rel);
        let is_dir = physical_path.as_deref().is_some_and(Path::is_dir);
        ScopeDecision {
            hidden: policy.is_hidden(&rel, is_dir),
            download_blocked: policy.is_download_blocked(&rel),
            physical_path,
            relative_path: rel,
        }
    }

    fn resolve_normalized(&self, rel: &str) -> Option<PathBuf> {
        let joined = if rel.is_empty() {
            self.canonical_root.clone()
        } else {
            self.canonical_root.join(rel)
        };

        match std::fs::canonicalize(&joined) {
            Ok(canonical) => {
                if canonical.starts_with(&self.canonical_root) {
                    Some(canonical)
                } else {
                    warn!(path = %rel, "rejected symlink escape from root");
                    None
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => self.resolve_missing(&joined, rel),
            Err(_) => None,
        }
    }

    /// Canonicalize the deepest existing ancestor of a nonexistent path,
    /// containment-check it, then re-append the missing tail.
    fn resolve_missing(&self, joined: &Path, rel: &str) -> Option<PathBuf> {
        let mut tail: Vec<std::ffi::OsString> = Vec::new();
        let mut cursor = joined.to_path_buf();
        loop {
            match std::fs::canonicalize(&cursor) {
                Ok(canonical) => {
                    if !canonical.starts_with(&self.canonical_root) {
                        warn!(path = %rel, "rejected symlink escape from root");
                        return None;
                    }
                    let mut resolved = canonical;
                    for component in tail.iter().rev() {
                        resolved.push(component);
                    }
                    return Some(resolved);
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tail.push(cursor.file_name()?.to_os_string());
                    cursor = cursor.parent()?.to_path_buf();
                }
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PolicyMatcher;

    fn fixture() -> (tempfile::TempDir, Resolver) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("inside.txt"), b"data").unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/report.pdf"), b"pdf").unwrap();
        let resolver = Resolver::new(dir.path()).unwrap();
        (dir, resolver)
    }

    #[test]
    fn test_normalize_strips_and_collapses() {
        assert_eq!(normalize_request_path("/a//b/"), Some("a/b".to_string()));
        assert_eq!(normalize_request_path(""), Some(String::new()));
        assert_eq!(normalize_request_path("/"), Some(String::new()));
    }

    #[test]
    fn test_normalize_rejects_dot_segments() {
        assert_eq!(normalize_request_path("../outside.txt"), None);
        assert_eq!(normalize_request_path("a/../b"), None);
        assert_eq!(normalize_request_path("a/./b"), None);
        assert_eq!(normalize_request_path("a/b\\c"), None);
    }

    #[test]
    fn test_resolve_existing_file() {
        let (_dir, resolver) = fixture();
        let resolved = resolver.resolve("/inside.txt").unwrap();
        assert!(resolved.ends_with("inside.txt"));
        assert!(resolved.starts_with(resolver.root()));
    }

    #[test]
    fn test_resolve_traversal_denied() {
        let (_dir, resolver) = fixture();
        assert!(resolver.resolve("../outside.txt").is_none());
        assert!(resolver.resolve("/docs/../../etc/passwd").is_none());
    }

    #[test]
    fn test_resolve_missing_file_stays_contained() {
        let (_dir, resolver) = fixture();
        let resolved = resolver.resolve("/docs/missing.txt").unwrap();
        assert!(resolved.starts_with(resolver.root()));
        assert!(resolved.ends_with("docs/missing.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_denied() {
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.txt"), b"secret").unwrap();

        let (dir, resolver) = fixture();
        std::os::unix::fs::symlink(
            outside.path().join("secret.txt"),
            dir.path().join("sneaky.txt"),
        )
        .unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("sneakydir")).unwrap();

        // a plain string-prefix check on the uncanonicalized path would pass both
        assert!(resolver.resolve("/sneaky.txt").is_none());
        assert!(resolver.resolve("/sneakydir/secret.txt").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_inside_root_allowed() {
        let (dir, resolver) = fixture();
        std::os::unix::fs::symlink(
            dir.path().join("inside.txt"),
            dir.path().join("alias.txt"),
        )
        .unwrap();
        let resolved = resolver.resolve("/alias.txt").unwrap();
        assert!(resolved.starts_with(resolver.root()));
    }

    #[test]
    fn test_resolve_scope_flags() {
        let (_dir, resolver) = fixture();
        let policy =
            PolicyMatcher::new(&["*.pdf".to_string()], true, false, &["exe".to_string()])
                .unwrap();

        let decision = resolver.resolve_scope("/docs/report.pdf", &policy);
        assert!(decision.physical_path.is_some());
        assert!(decision.hidden);
        assert_eq!(decision.relative_path, "docs/report.pdf");

        let decision = resolver.resolve_scope("/inside.txt", &policy);
        assert!(!decision.hidden);
        assert!(!decision.download_blocked);
    }

    #[test]
    fn test_resolve_scope_traversal_denied() {
        let (_dir, resolver) = fixture();
        let policy = PolicyMatcher::new(&[], false, false, &[]).unwrap();
        let decision = resolver.resolve_scope("/../etc/passwd", &policy);
        assert!(decision.physical_path.is_none());
    }
}
