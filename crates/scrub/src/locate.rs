//! Candidate discovery
//!
//! Only the direct children of each root are inspected. Leftovers live at the top
//! of well-known directories, so recursing would only add cost and false positives.

use crate::pattern::MatchPattern;
use crate::space::SearchSpace;
use scrub_core::FileSystem;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Finds entries matching a pattern under search roots
pub struct Locator<'a> {
    fs: &'a dyn FileSystem,
}

impl<'a> Locator<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs }
    }

    /// Matching children of a single root.
    ///
    /// Missing or unreadable roots contribute nothing: system directories are often
    /// unreadable for an unprivileged search.
    pub fn locate_in(&self, pattern: &MatchPattern, root: &Path) -> BTreeSet<PathBuf> {
        let resolved = match self.fs.canonicalize(root) {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::debug!(root = %root.display(), error = %e, "skipping search root");
                return BTreeSet::new();
            }
        };

        let children = match self.fs.list_children(&resolved) {
            Ok(children) => children,
            Err(e) => {
                tracing::debug!(root = %resolved.display(), error = %e, "cannot list search root");
                return BTreeSet::new();
            }
        };

        children
            .into_iter()
            .filter(|child| pattern.matches_path(child))
            .collect()
    }

    /// Union of the matches under every root of the space
    pub fn locate(&self, pattern: &MatchPattern, space: &SearchSpace) -> BTreeSet<PathBuf> {
        let mut found = BTreeSet::new();
        for root in space {
            found.extend(self.locate_in(pattern, root));
        }
        tracing::debug!(pattern = %pattern, roots = space.len(), found = found.len(), "search finished");
        found
    }
}
