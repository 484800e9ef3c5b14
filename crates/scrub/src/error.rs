//! Errors raised while resolving, searching and removing

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Scrub-specific errors
#[derive(Error, Debug)]
pub enum ScrubError {
    /// The spaces file is missing, unreadable or malformed
    #[error("Invalid search space file {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },

    /// The target cannot be turned into a name pattern
    #[error("Invalid target '{target}': {reason}")]
    Pattern { target: String, reason: String },

    /// The user could not be authorized for a right
    #[error("Authorization for {right} failed: {reason}")]
    Authorization {
        right: String,
        reason: String,
        status: Option<i32>,
    },

    /// The elevated side rejected a grant
    #[error("Authorization grant rejected: {0}")]
    Validation(String),

    /// The elevated executor could not be run or answered with garbage
    #[error("Elevated executor failed: {0}")]
    Executor(String),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The bundle id of an application could not be determined
    #[error("Failed to get bundle id: {0}")]
    Lookup(String),
}

pub type Result<T> = std::result::Result<T, ScrubError>;

impl ScrubError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn config(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error stops the whole action rather than a single item
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config { .. } | Self::Pattern { .. } | Self::Authorization { .. }
        )
    }
}
