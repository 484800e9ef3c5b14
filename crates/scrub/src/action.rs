//! The three things scrub can do: list, clean and uninstall

use crate::auth::{Authority, Right};
use crate::broker::{self, ElevatedExecutor, Failure, PrivilegeBroker, Route};
use crate::bundle::BundleLookup;
use crate::confirm::ConfirmationGate;
use crate::error::{Result, ScrubError};
use crate::locate::Locator;
use crate::pattern::MatchPattern;
use crate::space::SearchSpace;
use scrub_core::{FileSystem, PathCatalog};
use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    List,
    Clean,
    Uninstall,
}

/// One invocation's worth of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Print leftovers without touching them
    List { target: String },
    /// Remove leftovers
    Clean { target: String, force: bool },
    /// Remove application bundles, then their leftovers
    Uninstall { target: String },
}

impl Action {
    /// Build an action. Uninstall always confirms, so `force` is dropped for it.
    pub fn new(kind: ActionKind, target: impl Into<String>, force: bool) -> Self {
        let target = target.into();
        match kind {
            ActionKind::List => Action::List { target },
            ActionKind::Clean => Action::Clean { target, force },
            ActionKind::Uninstall => Action::Uninstall { target },
        }
    }

    pub fn target(&self) -> &str {
        match self {
            Action::List { target }
            | Action::Clean { target, .. }
            | Action::Uninstall { target } => target,
        }
    }
}

/// What an action found and did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub found: usize,
    pub removed: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<Failure>,
}

impl Summary {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Runs actions against a filesystem with the given collaborators
pub struct Scrubber<'a> {
    fs: &'a dyn FileSystem,
    catalog: &'a PathCatalog,
    authority: &'a dyn Authority,
    executor: &'a dyn ElevatedExecutor,
    bundles: &'a dyn BundleLookup,
}

impl<'a> Scrubber<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        catalog: &'a PathCatalog,
        authority: &'a dyn Authority,
        executor: &'a dyn ElevatedExecutor,
        bundles: &'a dyn BundleLookup,
    ) -> Self {
        Self {
            fs,
            catalog,
            authority,
            executor,
            bundles,
        }
    }

    pub fn perform<R: BufRead, W: Write, E: Write>(
        &self,
        action: &Action,
        space: &SearchSpace,
        gate: &mut ConfirmationGate<R, W, E>,
    ) -> Result<Summary> {
        tracing::debug!(?action, roots = space.len(), "performing action");
        match action {
            Action::List { target } => self.list(target, space, gate),
            Action::Clean { target, force } => self.clean(target, *force, space, gate),
            Action::Uninstall { target } => self.uninstall(target, space, gate),
        }
    }

    fn list<R: BufRead, W: Write, E: Write>(
        &self,
        target: &str,
        space: &SearchSpace,
        gate: &mut ConfirmationGate<R, W, E>,
    ) -> Result<Summary> {
        let pattern = MatchPattern::leftovers(target)?;
        let found = Locator::new(self.fs).locate(&pattern, space);

        if found.is_empty() {
            gate.say("No files found!").map_err(terminal)?;
        }
        for path in &found {
            gate.say(path.display()).map_err(terminal)?;
        }

        Ok(Summary {
            found: found.len(),
            ..Summary::default()
        })
    }

    fn clean<R: BufRead, W: Write, E: Write>(
        &self,
        target: &str,
        force: bool,
        space: &SearchSpace,
        gate: &mut ConfirmationGate<R, W, E>,
    ) -> Result<Summary> {
        let pattern = MatchPattern::leftovers(target)?;
        let found = Locator::new(self.fs).locate(&pattern, space);

        let mut summary = Summary {
            found: found.len(),
            ..Summary::default()
        };
        if found.is_empty() {
            gate.say("Nothing to clean!").map_err(terminal)?;
            return Ok(summary);
        }

        self.remove_batch(Right::Clean, &found, force, gate, &mut summary)?;
        Ok(summary)
    }

    fn uninstall<R: BufRead, W: Write, E: Write>(
        &self,
        target: &str,
        space: &SearchSpace,
        gate: &mut ConfirmationGate<R, W, E>,
    ) -> Result<Summary> {
        let pattern = MatchPattern::bundle(target)?;
        let applications = SearchSpace::applications(self.catalog);
        let locator = Locator::new(self.fs);
        let bundles = locator.locate(&pattern, &applications);

        let mut summary = Summary {
            found: bundles.len(),
            ..Summary::default()
        };
        if bundles.is_empty() {
            gate.say("Application not found!").map_err(terminal)?;
            return Ok(summary);
        }

        // The id can only be looked up while the bundle is still installed
        let application = format!("{}.app", target);
        let bundle_id = match self.bundles.bundle_id(&application) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(%application, error = %e, "leftovers will not be searched");
                None
            }
        };

        self.remove_batch(Right::Uninstall, &bundles, false, gate, &mut summary)?;

        if let Some(id) = bundle_id {
            let pattern = MatchPattern::leftovers(&id)?;
            let leftovers = locator.locate(&pattern, space);
            tracing::debug!(%id, found = leftovers.len(), "leftover pass");
            summary.found += leftovers.len();
            self.remove_batch(Right::Uninstall, &leftovers, false, gate, &mut summary)?;
        }

        Ok(summary)
    }

    /// Confirm the whole batch, then remove what was approved.
    ///
    /// Authorization happens before the first removal, so a refused authorization
    /// leaves the batch untouched. Every batch gets its own grant: confirming a batch
    /// can take longer than a grant lives.
    fn remove_batch<R: BufRead, W: Write, E: Write>(
        &self,
        right: Right,
        candidates: &BTreeSet<PathBuf>,
        force: bool,
        gate: &mut ConfirmationGate<R, W, E>,
        summary: &mut Summary,
    ) -> Result<()> {
        let decisions = gate.resolve(candidates, force).map_err(terminal)?;
        summary.skipped.extend(decisions.skipped);

        let mut routed = Vec::with_capacity(decisions.approved.len());
        for path in decisions.approved {
            match broker::route(self.fs, &path) {
                Ok(route) => routed.push((path, route)),
                Err(e) => record_failure(gate, summary, path, &e)?,
            }
        }

        let mut broker = PrivilegeBroker::new(right, self.authority, self.executor);
        if routed.iter().any(|(_, route)| *route == Route::Elevated) {
            broker.authorize()?;
        }

        for (path, route) in routed {
            let outcome = match route {
                Route::Direct => self
                    .fs
                    .remove_item(&path)
                    .map_err(|e| ScrubError::io(&path, e)),
                Route::Elevated => broker.remove(&path),
            };
            match outcome {
                Ok(()) => {
                    tracing::info!(path = %path.display(), ?route, "removed");
                    summary.removed.push(path);
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => record_failure(gate, summary, path, &e)?,
            }
        }
        Ok(())
    }
}

fn record_failure<R: BufRead, W: Write, E: Write>(
    gate: &mut ConfirmationGate<R, W, E>,
    summary: &mut Summary,
    path: PathBuf,
    error: &ScrubError,
) -> Result<()> {
    gate.warn(format_args!("Failed to delete {}: {}", path.display(), error))
        .map_err(terminal)?;
    summary.failed.push(Failure {
        path,
        message: error.to_string(),
    });
    Ok(())
}

fn terminal(e: io::Error) -> ScrubError {
    ScrubError::io("<terminal>", e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Grant, GRANT_TTL_SECS};
    use crate::broker::tests::FakeAuthority;
    use crate::broker::{ElevatedReport, ElevatedRequest, InProcessExecutor};
    use scrub_core::process::ROOT_UID;
    use scrub_core::MemoryFs;
    use chrono::{DateTime, Duration, Utc};
    use std::cell::{Cell, RefCell};
    use std::io::Cursor;

    const USER: u32 = 501;

    /// Forwards to the in-process elevated side and remembers every target
    struct RecordingExecutor<'a> {
        inner: InProcessExecutor<'a>,
        targets: RefCell<Vec<PathBuf>>,
    }

    impl<'a> RecordingExecutor<'a> {
        fn new(fs: &'a MemoryFs, authority: &'a FakeAuthority) -> Self {
            Self {
                inner: InProcessExecutor::new(fs, authority),
                targets: RefCell::new(Vec::new()),
            }
        }

        fn targets(&self) -> Vec<PathBuf> {
            self.targets.borrow().clone()
        }
    }

    impl ElevatedExecutor for RecordingExecutor<'_> {
        fn execute(&self, request: &ElevatedRequest) -> Result<ElevatedReport> {
            self.targets.borrow_mut().extend(request.targets.iter().cloned());
            self.inner.execute(request)
        }
    }

    /// Elevated side that rejects every grant
    struct RejectingExecutor;

    impl ElevatedExecutor for RejectingExecutor {
        fn execute(&self, request: &ElevatedRequest) -> Result<ElevatedReport> {
            let grant = Grant::from_external(&request.grant)?;
            Err(ScrubError::Validation(format!(
                "grant for uid {} not accepted",
                grant.uid()
            )))
        }
    }

    /// Authority on its own clock, which jumps past the grant lifetime after
    /// every successful validation
    struct SlowUserAuthority {
        now: Cell<DateTime<Utc>>,
        authorizations: Cell<usize>,
    }

    impl SlowUserAuthority {
        fn new() -> Self {
            Self {
                now: Cell::new(Utc::now()),
                authorizations: Cell::new(0),
            }
        }
    }

    impl Authority for SlowUserAuthority {
        fn authorize(&self, right: Right) -> Result<Grant> {
            self.authorizations.set(self.authorizations.get() + 1);
            Ok(Grant::issue_at(right, USER, self.now.get()))
        }

        fn validate(&self, grant: &Grant, right: Right) -> Result<()> {
            grant.check(right, self.now.get())?;
            self.now
                .set(self.now.get() + Duration::seconds(GRANT_TTL_SECS + 60));
            Ok(())
        }
    }

    struct StaticLookup(Option<&'static str>);

    impl BundleLookup for StaticLookup {
        fn bundle_id(&self, application: &str) -> Result<String> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| ScrubError::Lookup(format!("{} is not installed", application)))
        }
    }

    fn catalog() -> PathCatalog {
        PathCatalog::new("/Users/alice")
    }

    type TestGate = ConfirmationGate<Cursor<Vec<u8>>, Vec<u8>, Vec<u8>>;

    fn gate(script: &str) -> TestGate {
        ConfirmationGate::with_errors(
            Cursor::new(script.as_bytes().to_vec()),
            Vec::new(),
            Vec::new(),
        )
    }

    fn output(gate: &TestGate) -> String {
        String::from_utf8_lossy(gate.output()).into_owned()
    }

    fn errors(gate: &TestGate) -> String {
        String::from_utf8_lossy(gate.errors()).into_owned()
    }

    fn leftovers(fs: &MemoryFs) {
        fs.file("/Users/alice/Library/Caches/com.example.Foo/cache.db", b"")
            .file("/Users/alice/Library/Caches/com.example.Bar", b"")
            .file("/Users/alice/Library/Containers/Foo.plist", b"")
            .file_owned_by("/Library/LaunchDaemons/com.example.Foo.helper.plist", b"", ROOT_UID);
    }

    #[test]
    fn test_list_prints_matches_and_deletes_nothing() {
        let fs = MemoryFs::new(USER);
        leftovers(&fs);
        let catalog = catalog();
        let authority = FakeAuthority::granting();
        let executor = RecordingExecutor::new(&fs, &authority);
        let lookup = StaticLookup(None);
        let scrubber = Scrubber::new(&fs, &catalog, &authority, &executor, &lookup);
        let mut gate = gate("");

        let summary = scrubber
            .perform(
                &Action::new(ActionKind::List, "Foo", false),
                &SearchSpace::defaults(&catalog),
                &mut gate,
            )
            .unwrap();

        assert_eq!(summary.found, 3);
        assert!(summary.removed.is_empty());
        let out = output(&gate);
        assert!(out.contains("/Users/alice/Library/Containers/Foo.plist"));
        assert!(!out.contains("com.example.Bar"));
        assert!(fs.exists("/Users/alice/Library/Containers/Foo.plist"));
    }

    #[test]
    fn test_list_without_matches_reports_nothing_found() {
        let fs = MemoryFs::new(USER);
        let catalog = catalog();
        let authority = FakeAuthority::granting();
        let executor = RecordingExecutor::new(&fs, &authority);
        let lookup = StaticLookup(None);
        let scrubber = Scrubber::new(&fs, &catalog, &authority, &executor, &lookup);
        let mut gate = gate("");

        let summary = scrubber
            .perform(
                &Action::new(ActionKind::List, "Nope", false),
                &SearchSpace::defaults(&catalog),
                &mut gate,
            )
            .unwrap();

        assert_eq!(summary, Summary::default());
        assert_eq!(output(&gate), "No files found!\n");
    }

    #[test]
    fn test_clean_without_matches_reports_nothing_to_clean() {
        let fs = MemoryFs::new(USER);
        let catalog = catalog();
        let authority = FakeAuthority::granting();
        let executor = RecordingExecutor::new(&fs, &authority);
        let lookup = StaticLookup(None);
        let scrubber = Scrubber::new(&fs, &catalog, &authority, &executor, &lookup);
        let mut gate = gate("");

        scrubber
            .perform(
                &Action::new(ActionKind::Clean, "Nope", true),
                &SearchSpace::defaults(&catalog),
                &mut gate,
            )
            .unwrap();

        assert_eq!(output(&gate), "Nothing to clean!\n");
        assert_eq!(authority.authorizations.get(), 0);
    }

    #[test]
    fn test_clean_routes_root_owned_files_to_elevated_side() {
        let fs = MemoryFs::new(USER);
        leftovers(&fs);
        let catalog = catalog();
        let authority = FakeAuthority::granting();
        let executor = RecordingExecutor::new(&fs, &authority);
        let lookup = StaticLookup(None);
        let scrubber = Scrubber::new(&fs, &catalog, &authority, &executor, &lookup);
        let mut gate = gate("");

        let summary = scrubber
            .perform(
                &Action::new(ActionKind::Clean, "Foo", true),
                &SearchSpace::defaults(&catalog),
                &mut gate,
            )
            .unwrap();

        assert_eq!(summary.removed.len(), 3);
        assert!(!summary.has_failures());
        assert_eq!(
            executor.targets(),
            vec![PathBuf::from("/Library/LaunchDaemons/com.example.Foo.helper.plist")]
        );
        assert_eq!(authority.authorizations.get(), 1);
        assert!(!fs.exists("/Users/alice/Library/Caches/com.example.Foo"));
        assert!(fs.exists("/Users/alice/Library/Caches/com.example.Bar"));
    }

    #[test]
    fn test_clean_user_files_need_no_authorization() {
        let fs = MemoryFs::new(USER);
        fs.file("/Users/alice/Library/Caches/Foo", b"");
        let catalog = catalog();
        let authority = FakeAuthority::refusing();
        let executor = RecordingExecutor::new(&fs, &authority);
        let lookup = StaticLookup(None);
        let scrubber = Scrubber::new(&fs, &catalog, &authority, &executor, &lookup);
        let mut gate = gate("");

        let summary = scrubber
            .perform(
                &Action::new(ActionKind::Clean, "Foo", true),
                &SearchSpace::defaults(&catalog),
                &mut gate,
            )
            .unwrap();

        assert_eq!(summary.removed, vec![PathBuf::from("/Users/alice/Library/Caches/Foo")]);
        assert_eq!(authority.authorizations.get(), 0);
        assert!(executor.targets().is_empty());
    }

    #[test]
    fn test_clean_deletes_exactly_the_confirmed_candidates() {
        let fs = MemoryFs::new(USER);
        fs.file("/Users/alice/Library/Caches/A.Foo", b"")
            .file("/Users/alice/Library/Caches/B.Foo", b"")
            .file("/Users/alice/Library/Caches/C.Foo", b"");
        let catalog = catalog();
        let authority = FakeAuthority::granting();
        let executor = RecordingExecutor::new(&fs, &authority);
        let lookup = StaticLookup(None);
        let scrubber = Scrubber::new(&fs, &catalog, &authority, &executor, &lookup);
        let mut gate = gate("n\ny\ny\n");

        let summary = scrubber
            .perform(
                &Action::new(ActionKind::Clean, "Foo", false),
                &SearchSpace::defaults(&catalog),
                &mut gate,
            )
            .unwrap();

        assert_eq!(
            summary.skipped,
            vec![PathBuf::from("/Users/alice/Library/Caches/A.Foo")]
        );
        assert_eq!(summary.removed.len(), 2);
        assert!(fs.exists("/Users/alice/Library/Caches/A.Foo"));
        assert!(!fs.exists("/Users/alice/Library/Caches/B.Foo"));
        assert!(!fs.exists("/Users/alice/Library/Caches/C.Foo"));
    }

    #[test]
    fn test_refused_authorization_deletes_nothing() {
        let fs = MemoryFs::new(USER);
        leftovers(&fs);
        let catalog = catalog();
        let authority = FakeAuthority::refusing();
        let executor = RecordingExecutor::new(&fs, &authority);
        let lookup = StaticLookup(None);
        let scrubber = Scrubber::new(&fs, &catalog, &authority, &executor, &lookup);
        let mut gate = gate("");

        let err = scrubber
            .perform(
                &Action::new(ActionKind::Clean, "Foo", true),
                &SearchSpace::defaults(&catalog),
                &mut gate,
            )
            .unwrap_err();

        assert!(matches!(err, ScrubError::Authorization { .. }));
        assert!(fs.exists("/Users/alice/Library/Caches/com.example.Foo"));
        assert!(fs.exists("/Users/alice/Library/Containers/Foo.plist"));
        assert!(fs.exists("/Library/LaunchDaemons/com.example.Foo.helper.plist"));
    }

    #[test]
    fn test_rejected_grant_fails_only_that_item() {
        let fs = MemoryFs::new(USER);
        leftovers(&fs);
        let catalog = catalog();
        let authority = FakeAuthority::granting();
        let lookup = StaticLookup(None);
        let scrubber = Scrubber::new(&fs, &catalog, &authority, &RejectingExecutor, &lookup);
        let mut gate = gate("");

        let summary = scrubber
            .perform(
                &Action::new(ActionKind::Clean, "Foo", true),
                &SearchSpace::defaults(&catalog),
                &mut gate,
            )
            .unwrap();

        assert_eq!(summary.removed.len(), 2);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(
            summary.failed[0].path,
            PathBuf::from("/Library/LaunchDaemons/com.example.Foo.helper.plist")
        );
        assert!(fs.exists("/Library/LaunchDaemons/com.example.Foo.helper.plist"));
        assert!(errors(&gate).contains("Failed to delete /Library/LaunchDaemons"));
        assert!(!output(&gate).contains("Failed to delete"));
    }

    #[test]
    fn test_locked_file_is_a_per_item_failure() {
        let fs = MemoryFs::new(USER);
        fs.file("/Users/alice/Library/Caches/Foo", b"")
            .file("/Users/alice/Library/Caches/Foo.old", b"")
            .lock("/Users/alice/Library/Caches/Foo");
        let catalog = catalog();
        let authority = FakeAuthority::granting();
        let executor = RecordingExecutor::new(&fs, &authority);
        let lookup = StaticLookup(None);
        let scrubber = Scrubber::new(&fs, &catalog, &authority, &executor, &lookup);
        let mut gate = gate("");

        let summary = scrubber
            .perform(
                &Action::new(ActionKind::Clean, "Foo", true),
                &SearchSpace::defaults(&catalog),
                &mut gate,
            )
            .unwrap();

        assert_eq!(summary.failed.len(), 1);
        assert_eq!(
            summary.removed,
            vec![PathBuf::from("/Users/alice/Library/Caches/Foo.old")]
        );
    }

    #[test]
    fn test_uninstall_prompts_even_when_forced() {
        let fs = MemoryFs::new(USER);
        fs.dir("/Users/alice/Applications/Foo.app/Contents")
            .dir("/Users/alice/Applications/Foo Helper.app");
        let catalog = catalog();
        let authority = FakeAuthority::granting();
        let executor = RecordingExecutor::new(&fs, &authority);
        let lookup = StaticLookup(None);
        let scrubber = Scrubber::new(&fs, &catalog, &authority, &executor, &lookup);
        let mut gate = gate("n\ny\n");

        let action = Action::new(ActionKind::Uninstall, "Foo", true);
        let summary = scrubber
            .perform(&action, &SearchSpace::defaults(&catalog), &mut gate)
            .unwrap();

        assert_eq!(output(&gate).matches("? (Y/n)").count(), 2);
        assert_eq!(
            summary.skipped,
            vec![PathBuf::from("/Users/alice/Applications/Foo Helper.app")]
        );
        assert!(!fs.exists("/Users/alice/Applications/Foo.app"));
    }

    #[test]
    fn test_uninstall_removes_leftovers_by_bundle_id() {
        let fs = MemoryFs::new(USER);
        leftovers(&fs);
        fs.dir_owned_by("/Applications/Foo.app", ROOT_UID)
            .file("/Users/alice/Library/Caches/Foo.unrelated", b"");
        let catalog = catalog();
        let authority = FakeAuthority::granting();
        let executor = RecordingExecutor::new(&fs, &authority);
        let lookup = StaticLookup(Some("com.example.Foo"));
        let scrubber = Scrubber::new(&fs, &catalog, &authority, &executor, &lookup);
        let mut gate = gate("y\ny\ny\n");

        let summary = scrubber
            .perform(
                &Action::new(ActionKind::Uninstall, "Foo", false),
                &SearchSpace::defaults(&catalog),
                &mut gate,
            )
            .unwrap();

        assert_eq!(summary.removed.len(), 3);
        assert_eq!(authority.authorizations.get(), 2);
        assert!(!fs.exists("/Applications/Foo.app"));
        assert!(!fs.exists("/Users/alice/Library/Caches/com.example.Foo"));
        assert!(!fs.exists("/Library/LaunchDaemons/com.example.Foo.helper.plist"));
        assert!(fs.exists("/Users/alice/Library/Caches/Foo.unrelated"));
        assert!(fs.exists("/Users/alice/Library/Containers/Foo.plist"));
    }

    #[test]
    fn test_leftover_pass_gets_a_fresh_grant() {
        let fs = MemoryFs::new(USER);
        fs.dir_owned_by("/Applications/Foo.app", ROOT_UID)
            .file_owned_by("/Library/LaunchDaemons/com.example.Foo.plist", b"", ROOT_UID);
        let catalog = catalog();
        let authority = SlowUserAuthority::new();
        let executor = InProcessExecutor::new(&fs, &authority);
        let lookup = StaticLookup(Some("com.example.Foo"));
        let scrubber = Scrubber::new(&fs, &catalog, &authority, &executor, &lookup);
        let mut gate = gate("y\ny\n");

        let summary = scrubber
            .perform(
                &Action::new(ActionKind::Uninstall, "Foo", false),
                &SearchSpace::defaults(&catalog),
                &mut gate,
            )
            .unwrap();

        assert!(summary.failed.is_empty(), "{:?}", summary.failed);
        assert_eq!(
            summary.removed,
            vec![
                PathBuf::from("/Applications/Foo.app"),
                PathBuf::from("/Library/LaunchDaemons/com.example.Foo.plist"),
            ]
        );
        assert_eq!(authority.authorizations.get(), 2);
    }

    #[test]
    fn test_uninstall_without_bundle_id_still_removes_bundle() {
        let fs = MemoryFs::new(USER);
        leftovers(&fs);
        fs.dir("/Users/alice/Applications/Foo.app");
        let catalog = catalog();
        let authority = FakeAuthority::granting();
        let executor = RecordingExecutor::new(&fs, &authority);
        let lookup = StaticLookup(None);
        let scrubber = Scrubber::new(&fs, &catalog, &authority, &executor, &lookup);
        let mut gate = gate("y\n");

        let summary = scrubber
            .perform(
                &Action::new(ActionKind::Uninstall, "Foo", false),
                &SearchSpace::defaults(&catalog),
                &mut gate,
            )
            .unwrap();

        assert_eq!(
            summary.removed,
            vec![PathBuf::from("/Users/alice/Applications/Foo.app")]
        );
        assert!(fs.exists("/Users/alice/Library/Caches/com.example.Foo"));
    }

    #[test]
    fn test_uninstall_unknown_application() {
        let fs = MemoryFs::new(USER);
        leftovers(&fs);
        let catalog = catalog();
        let authority = FakeAuthority::granting();
        let executor = RecordingExecutor::new(&fs, &authority);
        let lookup = StaticLookup(Some("com.example.Foo"));
        let scrubber = Scrubber::new(&fs, &catalog, &authority, &executor, &lookup);
        let mut gate = gate("");

        let summary = scrubber
            .perform(
                &Action::new(ActionKind::Uninstall, "Foo", false),
                &SearchSpace::defaults(&catalog),
                &mut gate,
            )
            .unwrap();

        assert_eq!(summary.found, 0);
        assert_eq!(output(&gate), "Application not found!\n");
        assert!(fs.exists("/Users/alice/Library/Caches/com.example.Foo"));
    }

    #[test]
    fn test_malformed_target_is_fatal() {
        let fs = MemoryFs::new(USER);
        let catalog = catalog();
        let authority = FakeAuthority::granting();
        let executor = RecordingExecutor::new(&fs, &authority);
        let lookup = StaticLookup(None);
        let scrubber = Scrubber::new(&fs, &catalog, &authority, &executor, &lookup);
        let mut gate = gate("");

        let err = scrubber
            .perform(
                &Action::new(ActionKind::Clean, "../etc", true),
                &SearchSpace::defaults(&catalog),
                &mut gate,
            )
            .unwrap_err();

        assert!(matches!(err, ScrubError::Pattern { .. }));
    }

    #[test]
    fn test_new_action_drops_force_for_uninstall() {
        assert_eq!(
            Action::new(ActionKind::Clean, "x", true),
            Action::Clean {
                target: "x".into(),
                force: true
            }
        );
        assert_eq!(
            Action::new(ActionKind::Uninstall, "x", true),
            Action::Uninstall { target: "x".into() }
        );
        assert_eq!(Action::new(ActionKind::List, "x", true).target(), "x");
    }
}
