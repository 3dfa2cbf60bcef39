//! Hide and download-block policy.
//!
//! Hide patterns are globs (`*`, `?`, `**`) evaluated against the
//! normalized relative path and against the entry name, so `*.bak` hides
//! backup files anywhere while `private/**` hides a subtree. A trailing
//! slash marks a pattern as directory-only. Extension patterns (`*.ext`)
//! match case-insensitively; name globs are case-sensitive unless
//! configured otherwise.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::collections::HashSet;

use crate::error::{VfsError, VfsResult};

/// Compiled visibility and download policy.
#[derive(Debug, Clone)]
pub struct PolicyMatcher {
    any_globs: GlobSet,
    dir_globs: GlobSet,
    hide_dotfiles: bool,
    blocked_extensions: HashSet<String>,
}

impl PolicyMatcher {
    /// Compile a pattern set.
    ///
    /// # Errors
    ///
    /// Returns [`VfsError::InvalidPattern`] for a glob that fails to
    /// compile.
    pub fn new(
        hide_patterns: &[String],
        hide_dotfiles: bool,
        case_insensitive_globs: bool,
        blocked_extensions: &[String],
    ) -> VfsResult<Self> {
        let mut any = GlobSetBuilder::new();
        let mut dirs = GlobSetBuilder::new();

        for pattern in hide_patterns {
            let (target, dir_only) = match pattern.strip_suffix('/') {
                Some(stripped) => (stripped, true),
                None => (pattern.as_str(), false),
            };
            // extension checks are case-insensitive regardless of the
            // name-glob setting
            let case_insensitive = case_insensitive_globs || target.starts_with("*.");
            let glob = GlobBuilder::new(target)
                .literal_separator(true)
                .case_insensitive(case_insensitive)
                .build()
                .map_err(|e| VfsError::InvalidPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })?;
            if dir_only {
                dirs.add(glob);
            } else {
                any.add(glob);
            }
        }

        let any_globs = any.build().map_err(|e| VfsError::InvalidPattern {
            pattern: String::new(),
            reason: e.to_string(),
        })?;
        let dir_globs = dirs.build().map_err(|e| VfsError::InvalidPattern {
            pattern: String::new(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            any_globs,
            dir_globs,
            hide_dotfiles,
            blocked_extensions: blocked_extensions
                .iter()
                .map(|e| e.to_ascii_lowercase())
                .collect(),
        })
    }

    /// A matcher that hides nothing and blocks nothing.
    #[must_use]
    pub fn allow_all() -> Self {
        Self {
            any_globs: GlobSet::empty(),
            dir_globs: GlobSet::empty(),
            hide_dotfiles: false,
            blocked_extensions: HashSet::new(),
        }
    }

    /// Whether an entry is hidden by policy.
    ///
    /// `relative_path` must already be normalized (no leading slash). The
    /// root itself is never hidden.
    #[must_use]
    pub fn is_hidden(&self, relative_path: &str, is_directory: bool) -> bool {
        if relative_path.is_empty() {
            return false;
        }

        if self.hide_dotfiles
            && relative_path
                .split('/')
                .any(|segment| segment.starts_with('.'))
        {
            return true;
        }

        let name = relative_path.rsplit('/').next().unwrap_or(relative_path);
        if self.any_globs.is_match(relative_path) || self.any_globs.is_match(name) {
            return true;
        }

        is_directory && (self.dir_globs.is_match(relative_path) || self.dir_globs.is_match(name))
    }

    /// Whether download of an entry is refused by extension policy.
    ///
    /// Matching is case-insensitive on the final extension.
    #[must_use]
    pub fn is_download_blocked(&self, relative_path: &str) -> bool {
        let name = relative_path.rsplit('/').next().unwrap_or(relative_path);
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => self
                .blocked_extensions
                .contains(&ext.to_ascii_lowercase()),
            _ => false,
        }
    }
}
