//! Authorization rights and grants
//!
//! Removing a root-owned file needs two parties: the unprivileged process asks the
//! user to authorize a right and receives a [`Grant`], then an elevated process is
//! handed the grant's external form together with the files to remove. The elevated
//! side rebuilds the grant and validates it against the same right before touching
//! anything. A grant names a class of action, never a file.

use crate::error::{Result, ScrubError};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use scrub_core::process;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::Command;
use std::str::FromStr;

/// How long a grant stays valid after it was issued
pub const GRANT_TTL_SECS: i64 = 300;

/// A right guarding one kind of destructive action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Right {
    /// Removing leftover files
    Clean,
    /// Removing application bundles and their leftovers
    Uninstall,
}

impl Right {
    /// Name of the right as known to the authorization service
    pub fn name(&self) -> &'static str {
        match self {
            Right::Clean => "scrub.actions.clean",
            Right::Uninstall => "scrub.actions.uninstall",
        }
    }

    /// Short form used on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Right::Clean => "clean",
            Right::Uninstall => "uninstall",
        }
    }
}

impl fmt::Display for Right {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Right {
    type Err = ScrubError;

    fn from_str(s: &str) -> Result<Self> {
        [Right::Clean, Right::Uninstall]
            .into_iter()
            .find(|right| s == right.as_str() || s == right.name())
            .ok_or_else(|| ScrubError::Validation(format!("unknown right '{}'", s)))
    }
}

/// Proof that the user was allowed to request a class of destructive action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    right: String,
    uid: u32,
    issued_at: DateTime<Utc>,
    nonce: String,
}

impl Grant {
    /// Issue a fresh grant for `right` on behalf of `uid`
    pub fn issue(right: Right, uid: u32) -> Self {
        Self::issue_at(right, uid, Utc::now())
    }

    pub fn issue_at(right: Right, uid: u32, issued_at: DateTime<Utc>) -> Self {
        Self {
            right: right.name().to_string(),
            uid,
            issued_at,
            nonce: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn right(&self) -> &str {
        &self.right
    }

    /// uid of the user who was authorized
    pub fn uid(&self) -> u32 {
        self.uid
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Transferable form handed to the elevated side
    pub fn to_external(&self) -> Result<String> {
        let body = serde_json::to_vec(self)
            .map_err(|e| ScrubError::Executor(format!("cannot encode grant: {}", e)))?;
        Ok(URL_SAFE_NO_PAD.encode(body))
    }

    /// Rebuild a grant from its external form
    pub fn from_external(external: &str) -> Result<Self> {
        let body = URL_SAFE_NO_PAD
            .decode(external.trim())
            .map_err(|e| ScrubError::Validation(format!("malformed grant: {}", e)))?;
        serde_json::from_slice(&body)
            .map_err(|e| ScrubError::Validation(format!("malformed grant: {}", e)))
    }

    /// Check the grant covers `right` and is still fresh at `now`
    pub fn check(&self, right: Right, now: DateTime<Utc>) -> Result<()> {
        if self.right != right.name() {
            return Err(ScrubError::Validation(format!(
                "grant is for {}, not {}",
                self.right, right
            )));
        }
        if self.issued_at > now + Duration::seconds(5) {
            return Err(ScrubError::Validation("grant was issued in the future".into()));
        }
        if now - self.issued_at > Duration::seconds(GRANT_TTL_SECS) {
            return Err(ScrubError::Validation("grant has expired".into()));
        }
        Ok(())
    }
}

/// The platform's identity and rights service
pub trait Authority {
    /// Authenticate the user for `right`, interacting with them if needed
    fn authorize(&self, right: Right) -> Result<Grant>;

    /// Validate a grant on the elevated side
    fn validate(&self, grant: &Grant, right: Right) -> Result<()>;
}

/// Authorization through sudo.
///
/// `authorize` runs `sudo -v`, which prompts for the user's password and caches the
/// credentials for the elevated call that follows.
#[derive(Debug, Clone, Copy, Default)]
pub struct SudoAuthority;

impl Authority for SudoAuthority {
    fn authorize(&self, right: Right) -> Result<Grant> {
        let prompt = format!("scrub needs administrator rights for {}. Password: ", right);
        tracing::debug!(%right, "requesting authorization");

        let status = Command::new("sudo")
            .args(["-v", "-p", &prompt])
            .status()
            .map_err(|e| ScrubError::Authorization {
                right: right.name().to_string(),
                reason: format!("could not run sudo: {}", e),
                status: None,
            })?;

        if !status.success() {
            return Err(ScrubError::Authorization {
                right: right.name().to_string(),
                reason: "authentication failed".to_string(),
                status: status.code(),
            });
        }

        Ok(Grant::issue(right, process::current_uid()))
    }

    fn validate(&self, grant: &Grant, right: Right) -> Result<()> {
        grant.check(right, Utc::now())?;

        if !process::is_elevated() {
            return Err(ScrubError::Validation(
                "elevated side is not running as root".into(),
            ));
        }

        if let Some(caller) = process::sudo_caller() {
            if caller != grant.uid() {
                return Err(ScrubError::Validation(format!(
                    "grant belongs to uid {} but sudo was invoked by uid {}",
                    grant.uid(),
                    caller
                )));
            }
        }

        Ok(())
    }
}
