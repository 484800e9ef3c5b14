//! Process identity utilities

/// uid of the root account
pub const ROOT_UID: u32 = 0;

/// Real uid of the current process
pub fn current_uid() -> u32 {
    // SAFETY: getuid has no preconditions and cannot fail
    unsafe { libc::getuid() }
}

/// Effective uid of the current process
pub fn effective_uid() -> u32 {
    // SAFETY: geteuid has no preconditions and cannot fail
    unsafe { libc::geteuid() }
}

/// Check if the process runs with root privileges
pub fn is_elevated() -> bool {
    effective_uid() == ROOT_UID
}

/// uid of the user that invoked sudo, if we were started through it
pub fn sudo_caller() -> Option<u32> {
    parse_uid(&std::env::var("SUDO_UID").ok()?)
}

fn parse_uid(raw: &str) -> Option<u32> {
    raw.trim().parse().ok()
}
