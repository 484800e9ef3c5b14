//! Bundle identifier lookup

use crate::error::{Result, ScrubError};
use std::process::Command;

/// Finds the bundle identifier of an installed application
pub trait BundleLookup {
    /// `application` is the bundle name including its `.app` suffix
    fn bundle_id(&self, application: &str) -> Result<String>;
}

/// Asks Launch Services through AppleScript
#[derive(Debug, Clone, Copy, Default)]
pub struct OsaScript;

impl OsaScript {
    fn script(application: &str) -> String {
        let escaped = application.replace('\\', "\\\\").replace('"', "\\\"");
        format!("id of app \"{}\"", escaped)
    }
}

impl BundleLookup for OsaScript {
    fn bundle_id(&self, application: &str) -> Result<String> {
        let output = Command::new("osascript")
            .args(["-e", &Self::script(application)])
            .output()
            .map_err(|e| ScrubError::Lookup(format!("could not run osascript: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScrubError::Lookup(format!(
                "{}: {}",
                application,
                stderr.trim()
            )));
        }

        let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if id.is_empty() {
            return Err(ScrubError::Lookup(format!("{}: no bundle id", application)));
        }
        Ok(id)
    }
}
