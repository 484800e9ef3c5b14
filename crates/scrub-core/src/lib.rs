//! Scrub Core - Shared functionality for scrub
//!
//! Standard locations, process identity and the filesystem abstraction every
//! scrub action runs against.

pub mod fs;
pub mod paths;
pub mod process;

pub use fs::{FileSystem, LocalFs, MemoryFs};
pub use paths::{PathCatalog, Paths};
