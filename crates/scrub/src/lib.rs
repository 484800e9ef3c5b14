//! Scrub - find and remove what macOS applications leave behind
//!
//! Applications scatter caches, preferences, containers and launch agents across a
//! handful of well-known directories, and dragging the bundle to the trash leaves all
//! of it in place. Scrub searches those directories for entries named after a target,
//! asks before removing each one, and escalates through an authorization grant when an
//! entry belongs to root.
//!
//! The pieces:
//! - [`space`] decides which directories are searched
//! - [`locate`] finds matching entries under them
//! - [`confirm`] asks the user about each candidate
//! - [`auth`] and [`broker`] remove root-owned entries with elevated rights
//! - [`action`] ties it together for `list`, `clean` and `uninstall`

pub mod action;
pub mod auth;
pub mod broker;
pub mod bundle;
pub mod confirm;
pub mod error;
pub mod locate;
pub mod pattern;
pub mod space;

pub use action::{Action, ActionKind, Scrubber, Summary};
pub use auth::{Authority, Grant, Right, SudoAuthority};
pub use broker::{ElevatedExecutor, InProcessExecutor, PrivilegeBroker, SudoExecutor};
pub use bundle::{BundleLookup, OsaScript};
pub use confirm::ConfirmationGate;
pub use error::{Result, ScrubError};
pub use locate::Locator;
pub use pattern::MatchPattern;
pub use space::{SearchSpace, SpaceSource, SpaceStore, YamlCodec};
