//! Filesystem access
//!
//! Everything scrub does to the disk goes through [`FileSystem`], so searches,
//! ownership checks and deletions can run against [`LocalFs`] in production and
//! against [`MemoryFs`] in tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::{Component, Path, PathBuf};

use crate::process::ROOT_UID;

/// Operations scrub needs from a filesystem
pub trait FileSystem {
    /// Direct children of a directory (no recursion)
    fn list_children(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Absolute path with every symlink resolved
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;

    /// uid owning the entry itself (symlinks are not followed)
    fn owner(&self, path: &Path) -> io::Result<u32>;

    /// Remove a file, symlink or whole directory tree
    fn remove_item(&self, path: &Path) -> io::Result<()>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

/// The real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn list_children(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect()
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path)
    }

    fn owner(&self, path: &Path) -> io::Result<u32> {
        Ok(fs::symlink_metadata(path)?.uid())
    }

    fn remove_item(&self, path: &Path) -> io::Result<()> {
        let metadata = fs::symlink_metadata(path)?;
        if metadata.is_dir() {
            tracing::debug!(path = %path.display(), "removing directory tree");
            fs::remove_dir_all(path)
        } else {
            tracing::debug!(path = %path.display(), "removing file");
            fs::remove_file(path)
        }
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents)
    }
}

/// Symlink hops allowed before resolution gives up
const MAX_SYMLINK_HOPS: usize = 40;

#[derive(Debug, Clone)]
enum Kind {
    Dir,
    File(Vec<u8>),
    Symlink(PathBuf),
}

#[derive(Debug, Clone)]
struct Node {
    kind: Kind,
    owner: u32,
}

enum Step {
    Parent,
    Name(OsString),
}

/// An in-memory filesystem tree with per-entry owners.
///
/// Paths are absolute. Parents are created implicitly, owned by the default owner.
/// Entries can be locked to make listing and removal fail with `PermissionDenied`.
#[derive(Debug)]
pub struct MemoryFs {
    nodes: RefCell<BTreeMap<PathBuf, Node>>,
    locked: RefCell<BTreeSet<PathBuf>>,
    default_owner: u32,
}

impl MemoryFs {
    /// Empty tree whose new entries belong to `default_owner`
    pub fn new(default_owner: u32) -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            PathBuf::from("/"),
            Node {
                kind: Kind::Dir,
                owner: ROOT_UID,
            },
        );
        Self {
            nodes: RefCell::new(nodes),
            locked: RefCell::new(BTreeSet::new()),
            default_owner,
        }
    }

    pub fn dir(&self, path: impl AsRef<Path>) -> &Self {
        self.insert(path.as_ref(), Kind::Dir, self.default_owner)
    }

    pub fn dir_owned_by(&self, path: impl AsRef<Path>, owner: u32) -> &Self {
        self.insert(path.as_ref(), Kind::Dir, owner)
    }

    pub fn file(&self, path: impl AsRef<Path>, contents: &[u8]) -> &Self {
        self.insert(path.as_ref(), Kind::File(contents.to_vec()), self.default_owner)
    }

    pub fn file_owned_by(&self, path: impl AsRef<Path>, contents: &[u8], owner: u32) -> &Self {
        self.insert(path.as_ref(), Kind::File(contents.to_vec()), owner)
    }

    pub fn symlink(&self, path: impl AsRef<Path>, target: impl AsRef<Path>) -> &Self {
        let target = target.as_ref().to_path_buf();
        self.insert(path.as_ref(), Kind::Symlink(target), self.default_owner)
    }

    /// Make listing and removing `path` fail with `PermissionDenied`
    pub fn lock(&self, path: impl AsRef<Path>) -> &Self {
        self.locked.borrow_mut().insert(path.as_ref().to_path_buf());
        self
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.nodes.borrow().contains_key(path.as_ref())
    }

    fn insert(&self, path: &Path, kind: Kind, owner: u32) -> &Self {
        let mut nodes = self.nodes.borrow_mut();
        for ancestor in path.ancestors().skip(1) {
            nodes.entry(ancestor.to_path_buf()).or_insert(Node {
                kind: Kind::Dir,
                owner: self.default_owner,
            });
        }
        nodes.insert(path.to_path_buf(), Node { kind, owner });
        self
    }

    fn check_unlocked(&self, path: &Path) -> io::Result<()> {
        if self.locked.borrow().contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {}", path.display()),
            ));
        }
        Ok(())
    }

    fn resolve(&self, path: &Path) -> io::Result<PathBuf> {
        let nodes = self.nodes.borrow();
        let mut resolved = PathBuf::from("/");
        let mut pending: VecDeque<Step> = steps(path);
        let mut hops = 0;

        while let Some(step) = pending.pop_front() {
            let name = match step {
                Step::Parent => {
                    resolved.pop();
                    continue;
                }
                Step::Name(name) => name,
            };

            let candidate = resolved.join(&name);
            match nodes.get(&candidate) {
                None => return Err(not_found(&candidate)),
                Some(Node {
                    kind: Kind::Symlink(target),
                    ..
                }) => {
                    hops += 1;
                    if hops > MAX_SYMLINK_HOPS {
                        return Err(io::Error::new(
                            io::ErrorKind::Other,
                            format!("too many levels of symbolic links: {}", path.display()),
                        ));
                    }
                    if target.is_absolute() {
                        resolved = PathBuf::from("/");
                    }
                    let mut redirected = steps(target);
                    redirected.extend(pending);
                    pending = redirected;
                }
                Some(_) => resolved = candidate,
            }
        }

        Ok(resolved)
    }
}

impl FileSystem for MemoryFs {
    fn list_children(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let resolved = self.resolve(dir)?;
        self.check_unlocked(&resolved)?;

        let nodes = self.nodes.borrow();
        match nodes.get(&resolved) {
            Some(Node { kind: Kind::Dir, .. }) => {}
            Some(_) => return Err(not_a_directory(dir)),
            None => return Err(not_found(dir)),
        }

        Ok(nodes
            .keys()
            .filter(|p| p.parent() == Some(resolved.as_path()) && p.as_path() != resolved)
            .filter_map(|p| p.file_name())
            .map(|name| dir.join(name))
            .collect())
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        self.resolve(path)
    }

    fn owner(&self, path: &Path) -> io::Result<u32> {
        self.nodes
            .borrow()
            .get(path)
            .map(|node| node.owner)
            .ok_or_else(|| not_found(path))
    }

    fn remove_item(&self, path: &Path) -> io::Result<()> {
        self.check_unlocked(path)?;

        let mut nodes = self.nodes.borrow_mut();
        if !nodes.contains_key(path) {
            return Err(not_found(path));
        }
        nodes.retain(|p, _| !p.starts_with(path));
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        {
            let nodes = self.nodes.borrow();
            for ancestor in path.ancestors() {
                match nodes.get(ancestor) {
                    Some(Node { kind: Kind::Dir, .. }) | None => {}
                    Some(_) => {
                        return Err(io::Error::new(
                            io::ErrorKind::AlreadyExists,
                            format!("file exists: {}", ancestor.display()),
                        ))
                    }
                }
            }
        }
        self.dir(path);
        Ok(())
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let resolved = self.resolve(path)?;
        match self.nodes.borrow().get(&resolved) {
            Some(Node {
                kind: Kind::File(contents),
                ..
            }) => Ok(contents.clone()),
            Some(_) => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("is a directory: {}", path.display()),
            )),
            None => Err(not_found(path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let parent = path.parent().ok_or_else(|| not_found(path))?;
        let parent = self.resolve(parent)?;
        let target = match path.file_name() {
            Some(name) => parent.join(name),
            None => return Err(not_found(path)),
        };

        let mut nodes = self.nodes.borrow_mut();
        match nodes.get(&parent) {
            Some(Node { kind: Kind::Dir, .. }) => {}
            _ => return Err(not_a_directory(&parent)),
        }
        let owner = nodes.get(&target).map_or(self.default_owner, |n| n.owner);
        nodes.insert(
            target,
            Node {
                kind: Kind::File(contents.to_vec()),
                owner,
            },
        );
        Ok(())
    }
}

fn steps(path: &Path) -> VecDeque<Step> {
    path.components()
        .filter_map(|c| match c {
            Component::ParentDir => Some(Step::Parent),
            Component::Normal(name) => Some(Step::Name(name.to_os_string())),
            _ => None,
        })
        .collect()
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("no such file or directory: {}", path.display()),
    )
}

fn not_a_directory(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::Other,
        format!("not a directory: {}", path.display()),
    )
}
