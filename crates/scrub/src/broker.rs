//! Ownership-aware deletion
//!
//! Files the user owns are removed directly. Root-owned files go through an
//! [`ElevatedExecutor`] that receives only a grant and an explicit list of targets.

use crate::auth::{Authority, Grant, Right};
use crate::error::{Result, ScrubError};
use scrub_core::process::ROOT_UID;
use scrub_core::FileSystem;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Exit status of the elevated side when the grant does not validate
pub const VALIDATION_EXIT_CODE: i32 = 77;

/// What the elevated side is asked to do
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElevatedRequest {
    pub right: Right,
    /// External form of the grant
    pub grant: String,
    pub targets: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub path: PathBuf,
    pub message: String,
}

/// What the elevated side did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElevatedReport {
    pub removed: Vec<PathBuf>,
    pub failed: Vec<Failure>,
}

/// Runs an [`ElevatedRequest`] with higher privileges
pub trait ElevatedExecutor {
    fn execute(&self, request: &ElevatedRequest) -> Result<ElevatedReport>;
}

/// The elevated side of the protocol: rebuild the grant, validate it, then delete.
///
/// A grant that does not validate fails the whole request and nothing is touched.
pub fn run_elevated(
    fs: &dyn FileSystem,
    authority: &dyn Authority,
    request: &ElevatedRequest,
) -> Result<ElevatedReport> {
    let grant = Grant::from_external(&request.grant)?;
    authority.validate(&grant, request.right)?;

    let mut report = ElevatedReport::default();
    for target in &request.targets {
        if !target.is_absolute() {
            report.failed.push(Failure {
                path: target.clone(),
                message: "refusing relative path".to_string(),
            });
            continue;
        }

        match fs.remove_item(target) {
            Ok(()) => {
                tracing::info!(path = %target.display(), right = %request.right, "removed with elevated rights");
                report.removed.push(target.clone());
            }
            Err(e) => report.failed.push(Failure {
                path: target.clone(),
                message: e.to_string(),
            }),
        }
    }
    Ok(report)
}

/// Serve an elevated request the way the `elevated` command does: the report goes to
/// `out` as JSON, a rejected grant to `err`. Returns the exit status to use.
pub fn answer_elevated(
    fs: &dyn FileSystem,
    authority: &dyn Authority,
    request: &ElevatedRequest,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<i32> {
    let unwritable = |e: io::Error| ScrubError::Executor(format!("cannot write answer: {}", e));

    match run_elevated(fs, authority, request) {
        Ok(report) => {
            let body = serde_json::to_string(&report)
                .map_err(|e| ScrubError::Executor(format!("cannot encode report: {}", e)))?;
            writeln!(out, "{}", body).map_err(unwritable)?;
            Ok(0)
        }
        Err(ScrubError::Validation(reason)) => {
            writeln!(err, "{}", reason).map_err(unwritable)?;
            Ok(VALIDATION_EXIT_CODE)
        }
        Err(e) => Err(e),
    }
}

/// Interpret what the elevated process left behind
pub fn read_report(output: &Output) -> Result<ElevatedReport> {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    match output.status.code() {
        Some(0) => serde_json::from_slice(&output.stdout)
            .map_err(|e| ScrubError::Executor(format!("unreadable report: {}", e))),
        Some(VALIDATION_EXIT_CODE) => Err(ScrubError::Validation(stderr)),
        Some(code) => Err(ScrubError::Executor(format!(
            "exited with status {}: {}",
            code, stderr
        ))),
        None => Err(ScrubError::Executor("terminated by signal".to_string())),
    }
}

/// Runs the elevated side in this process
pub struct InProcessExecutor<'a> {
    fs: &'a dyn FileSystem,
    authority: &'a dyn Authority,
}

impl<'a> InProcessExecutor<'a> {
    pub fn new(fs: &'a dyn FileSystem, authority: &'a dyn Authority) -> Self {
        Self { fs, authority }
    }
}

impl ElevatedExecutor for InProcessExecutor<'_> {
    fn execute(&self, request: &ElevatedRequest) -> Result<ElevatedReport> {
        run_elevated(self.fs, self.authority, request)
    }
}

/// Re-runs the scrub executable through `sudo -n` with the hidden `elevated` command
#[derive(Debug, Clone)]
pub struct SudoExecutor {
    launcher: PathBuf,
    program: PathBuf,
}

impl SudoExecutor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self::with_launcher("sudo", program)
    }

    /// Use `launcher` in place of sudo. It receives `-n`, the program and its arguments.
    pub fn with_launcher(launcher: impl Into<PathBuf>, program: impl Into<PathBuf>) -> Self {
        Self {
            launcher: launcher.into(),
            program: program.into(),
        }
    }

    /// Executor running the binary of the current process
    pub fn current() -> Result<Self> {
        let program = std::env::current_exe()
            .map_err(|e| ScrubError::Executor(format!("cannot locate scrub executable: {}", e)))?;
        Ok(Self::new(program))
    }
}

impl ElevatedExecutor for SudoExecutor {
    fn execute(&self, request: &ElevatedRequest) -> Result<ElevatedReport> {
        tracing::debug!(program = %self.program.display(), targets = request.targets.len(), "running elevated executor");

        let output = Command::new(&self.launcher)
            .arg("-n")
            .arg(&self.program)
            .args(["elevated", "--right", request.right.as_str(), "--grant"])
            .arg(&request.grant)
            .arg("--")
            .args(&request.targets)
            .output()
            .map_err(|e| {
                ScrubError::Executor(format!("could not run {}: {}", self.launcher.display(), e))
            })?;

        read_report(&output)
    }
}

/// How an approved candidate will be removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Direct,
    Elevated,
}

/// Root-owned entries need the elevated path
pub fn route(fs: &dyn FileSystem, path: &Path) -> Result<Route> {
    let owner = fs.owner(path).map_err(|e| ScrubError::io(path, e))?;
    let route = if owner == ROOT_UID {
        Route::Elevated
    } else {
        Route::Direct
    };
    tracing::debug!(path = %path.display(), owner, ?route, "routing candidate");
    Ok(route)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerState {
    Unauthenticated,
    Authorized(Grant),
}

/// Holds the grant for one action kind and drives elevated removals
pub struct PrivilegeBroker<'a> {
    right: Right,
    authority: &'a dyn Authority,
    executor: &'a dyn ElevatedExecutor,
    state: BrokerState,
}

impl<'a> PrivilegeBroker<'a> {
    pub fn new(
        right: Right,
        authority: &'a dyn Authority,
        executor: &'a dyn ElevatedExecutor,
    ) -> Self {
        Self {
            right,
            authority,
            executor,
            state: BrokerState::Unauthenticated,
        }
    }

    pub fn state(&self) -> &BrokerState {
        &self.state
    }

    pub fn is_authorized(&self) -> bool {
        matches!(self.state, BrokerState::Authorized(_))
    }

    /// Obtain a grant unless one is already held
    pub fn authorize(&mut self) -> Result<&Grant> {
        if let BrokerState::Unauthenticated = self.state {
            let grant = self.authority.authorize(self.right)?;
            tracing::debug!(right = %self.right, "authorized");
            self.state = BrokerState::Authorized(grant);
        }
        match &self.state {
            BrokerState::Authorized(grant) => Ok(grant),
            BrokerState::Unauthenticated => Err(ScrubError::Authorization {
                right: self.right.name().to_string(),
                reason: "no grant".to_string(),
                status: None,
            }),
        }
    }

    /// Remove one root-owned path through the elevated executor
    pub fn remove(&mut self, path: &Path) -> Result<()> {
        let right = self.right;
        let grant = self.authorize()?.to_external()?;
        let request = ElevatedRequest {
            right,
            grant,
            targets: vec![path.to_path_buf()],
        };

        let report = self.executor.execute(&request)?;
        if let Some(failure) = report.failed.iter().find(|f| f.path == path) {
            return Err(ScrubError::io(
                path,
                io::Error::new(io::ErrorKind::Other, failure.message.clone()),
            ));
        }
        if !report.removed.iter().any(|removed| removed == path) {
            return Err(ScrubError::Executor(format!(
                "no outcome reported for {}",
                path.display()
            )));
        }
        Ok(())
    }
}
