//! Search space resolution and persistence
//!
//! The search space is the set of directories scrub looks in. It comes from:
//! - a spaces file named on the command line (must exist and parse)
//! - the process-owned spaces file, written with the defaults on first run
//! - the compiled-in defaults, when the process-owned file cannot be read
//!
//! Spaces file format (YAML):
//!
//! ```yaml
//! spaces:
//!   - ~/Library/Caches
//!   - /Library/Application Support
//! ```

use crate::error::{Result, ScrubError};
use anyhow::Context;
use scrub_core::{FileSystem, PathCatalog};
use serde::{Deserialize, Serialize};
use std::collections::btree_set;
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

/// A de-duplicated set of directory roots
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSpace {
    roots: BTreeSet<PathBuf>,
}

impl SearchSpace {
    pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            roots: roots.into_iter().collect(),
        }
    }

    /// The compiled-in default roots
    pub fn defaults(catalog: &PathCatalog) -> Self {
        Self::new(catalog.default_spaces())
    }

    /// Directories holding application bundles
    pub fn applications(catalog: &PathCatalog) -> Self {
        Self::new(catalog.applications())
    }

    pub fn iter(&self) -> btree_set::Iter<'_, PathBuf> {
        self.roots.iter()
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn contains(&self, root: &Path) -> bool {
        self.roots.contains(root)
    }
}

impl<'a> IntoIterator for &'a SearchSpace {
    type Item = &'a PathBuf;
    type IntoIter = btree_set::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.roots.iter()
    }
}

/// Encodes and decodes the spaces file as a list of path strings
pub trait SpacesCodec {
    fn decode(&self, bytes: &[u8]) -> anyhow::Result<Vec<String>>;

    fn encode(&self, entries: &[String]) -> anyhow::Result<Vec<u8>>;
}

#[derive(Debug, Serialize, Deserialize)]
struct SpacesDocument {
    spaces: Vec<String>,
}

/// YAML spaces files
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl SpacesCodec for YamlCodec {
    fn decode(&self, bytes: &[u8]) -> anyhow::Result<Vec<String>> {
        let document: SpacesDocument =
            serde_yaml::from_slice(bytes).context("Failed to parse spaces file")?;
        Ok(document.spaces)
    }

    fn encode(&self, entries: &[String]) -> anyhow::Result<Vec<u8>> {
        let document = SpacesDocument {
            spaces: entries.to_vec(),
        };
        Ok(serde_yaml::to_string(&document)?.into_bytes())
    }
}

/// Where a resolved search space came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpaceSource {
    /// A spaces file named by the user
    Override(PathBuf),
    /// The existing process-owned spaces file
    Stored(PathBuf),
    /// The process-owned spaces file was missing and has been written
    Created(PathBuf),
    /// The process-owned spaces file could not be read; defaults are used this run
    Fallback { path: PathBuf, reason: String },
}

/// A search space together with its provenance
#[derive(Debug, Clone)]
pub struct Resolution {
    pub space: SearchSpace,
    pub source: SpaceSource,
}

enum ReadFailure {
    Missing,
    Invalid(String),
}

/// Reads and writes spaces files
pub struct SpaceStore<'a> {
    fs: &'a dyn FileSystem,
    codec: &'a dyn SpacesCodec,
    catalog: &'a PathCatalog,
    default_file: PathBuf,
}

impl<'a> SpaceStore<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        codec: &'a dyn SpacesCodec,
        catalog: &'a PathCatalog,
        default_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fs,
            codec,
            catalog,
            default_file: default_file.into(),
        }
    }

    /// Determine the search space for this run
    pub fn resolve(&self, override_file: Option<&Path>) -> Result<Resolution> {
        if let Some(path) = override_file {
            let space = self.read(path).map_err(|failure| match failure {
                ReadFailure::Missing => ScrubError::config(path, "file does not exist"),
                ReadFailure::Invalid(reason) => ScrubError::config(path, reason),
            })?;
            return Ok(Resolution {
                space,
                source: SpaceSource::Override(path.to_path_buf()),
            });
        }

        let path = self.default_file.clone();
        match self.read(&path) {
            Ok(space) => Ok(Resolution {
                space,
                source: SpaceSource::Stored(path),
            }),
            Err(ReadFailure::Missing) => {
                let space = SearchSpace::defaults(self.catalog);
                self.write(&space, &path)?;
                tracing::info!(path = %path.display(), "created default search space file");
                Ok(Resolution {
                    space,
                    source: SpaceSource::Created(path),
                })
            }
            Err(ReadFailure::Invalid(reason)) => {
                tracing::warn!(path = %path.display(), %reason, "using default search space");
                Ok(Resolution {
                    space: SearchSpace::defaults(self.catalog),
                    source: SpaceSource::Fallback { path, reason },
                })
            }
        }
    }

    /// Persist a search space, creating parent directories as needed
    pub fn write(&self, space: &SearchSpace, path: &Path) -> Result<()> {
        let entries: Vec<String> = space
            .iter()
            .map(|root| root.to_string_lossy().into_owned())
            .collect();
        let bytes = self
            .codec
            .encode(&entries)
            .map_err(|e| ScrubError::config(path, format!("{:#}", e)))?;

        if let Some(parent) = path.parent() {
            self.fs
                .create_dir_all(parent)
                .map_err(|e| ScrubError::config(path, e.to_string()))?;
        }
        self.fs
            .write(path, &bytes)
            .map_err(|e| ScrubError::config(path, e.to_string()))
    }

    fn read(&self, path: &Path) -> std::result::Result<SearchSpace, ReadFailure> {
        let bytes = self.fs.read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ReadFailure::Missing,
            _ => ReadFailure::Invalid(e.to_string()),
        })?;
        let entries = self
            .codec
            .decode(&bytes)
            .map_err(|e| ReadFailure::Invalid(format!("{:#}", e)))?;

        let home = self.catalog.home().to_string_lossy().into_owned();
        let mut roots = BTreeSet::new();
        for entry in entries {
            let expanded = shellexpand::tilde_with_context(&entry, || Some(home.as_str()));
            let root = PathBuf::from(expanded.into_owned());
            if !root.is_absolute() {
                return Err(ReadFailure::Invalid(format!(
                    "'{}' is not an absolute path",
                    entry
                )));
            }
            roots.insert(root);
        }

        Ok(SearchSpace { roots })
    }
}
