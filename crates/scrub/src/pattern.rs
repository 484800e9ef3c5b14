//! Name patterns
//!
//! A target like `Slack` is turned into a regex that is applied to the last
//! component of every path a search turns up. Two shapes exist:
//!
//! - leftovers: the target surrounded by runs of `[A-Za-z0-9_.]`, anchored to the
//!   whole name (`com.tinyspeck.slackmacgap` for `slack`, `Slack.savedState` for `Slack`)
//! - bundles: any name containing the target (`Slack.app`, `Slack Helper.app`)
//!
//! The target is always literal; regex metacharacters in it are escaped.

use crate::error::{Result, ScrubError};
use regex::Regex;
use std::fmt;
use std::path::Path;

/// Characters allowed around the target in a leftover name
const WILDCARD: &str = "[A-Za-z0-9_.]*";

/// A compiled name pattern
#[derive(Debug, Clone)]
pub struct MatchPattern {
    target: String,
    regex: Regex,
}

impl MatchPattern {
    /// Pattern for leftover files of `target`
    pub fn leftovers(target: &str) -> Result<Self> {
        check_target(target)?;
        let source = format!("^{WILDCARD}{}{WILDCARD}$", regex::escape(target));
        Self::compile(target, &source)
    }

    /// Pattern for application bundles of `target`
    pub fn bundle(target: &str) -> Result<Self> {
        check_target(target)?;
        Self::compile(target, &regex::escape(target))
    }

    fn compile(target: &str, source: &str) -> Result<Self> {
        let regex = Regex::new(source).map_err(|e| ScrubError::Pattern {
            target: target.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            target: target.to_string(),
            regex,
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Check a single file name
    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    /// Check the last component of a path. Names that are not UTF-8 never match.
    pub fn matches_path(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .map_or(false, |name| self.matches(name))
    }
}

impl fmt::Display for MatchPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.regex.as_str())
    }
}

/// A target has to be something that could appear inside a single path component
fn check_target(target: &str) -> Result<()> {
    let reason = if target.contains('/') {
        "a name cannot contain '/'"
    } else if target.contains('\0') {
        "a name cannot contain NUL"
    } else {
        return Ok(());
    };

    Err(ScrubError::Pattern {
        target: target.to_string(),
        reason: reason.to_string(),
    })
}
