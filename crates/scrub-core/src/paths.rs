//! Standard paths used by scrub

use std::path::{Path, PathBuf};

/// Directories applications commonly leave artifacts in.
///
/// Entries starting with `/` are system-wide, everything else is relative to the
/// current user's home.
const DEFAULT_SPACES: &[&str] = &[
    "Library/Application Scripts",
    "Library/Application Support",
    "/Library/Application Support",
    "Library/Caches",
    "/Library/Caches",
    "Library/Containers",
    "Library/Group Containers",
    "Library/LaunchAgents",
    "/Library/LaunchAgents",
    "/Library/LaunchDaemons",
];

/// Directories application bundles are installed into
const APPLICATION_DIRS: &[&str] = &["Applications", "/Applications"];

/// Name of the search space file inside the config directory
const SPACES_FILE: &str = "spaces.yaml";

/// Standard scrub paths
#[derive(Debug, Clone)]
pub struct Paths {
    /// Home directory of the invoking user
    pub home: PathBuf,
    /// Config directory (~/Library/Application Support/scrub on macOS)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));

        let config = dirs::config_dir()
            .unwrap_or_else(|| home.join(".config"))
            .join("scrub");

        Self { home, config }
    }

    /// Paths rooted at an arbitrary home directory
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let config = home.join(".config").join("scrub");
        Self { home, config }
    }

    /// Location of the process-owned search space file
    pub fn spaces_file(&self) -> PathBuf {
        self.config.join(SPACES_FILE)
    }

    /// Catalog of well-known directories for this user
    pub fn catalog(&self) -> PathCatalog {
        PathCatalog::new(&self.home)
    }
}

/// The fixed set of well-known directories scrub knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathCatalog {
    home: PathBuf,
}

impl PathCatalog {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Default search roots, used when no spaces file is available
    pub fn default_spaces(&self) -> Vec<PathBuf> {
        DEFAULT_SPACES.iter().map(|entry| self.resolve(entry)).collect()
    }

    /// Directories searched for application bundles
    pub fn applications(&self) -> Vec<PathBuf> {
        APPLICATION_DIRS.iter().map(|entry| self.resolve(entry)).collect()
    }

    fn resolve(&self, entry: &str) -> PathBuf {
        if entry.starts_with('/') {
            PathBuf::from(entry)
        } else {
            self.home.join(entry)
        }
    }
}
