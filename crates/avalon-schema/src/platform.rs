//! Host platform probes.
//!
//! Packages declare supported architectures and distributions as plain
//! strings (`arches`/`distros` in the metadata); the compatibility gate
//! compares them against these probes.

use std::fs;
use std::path::Path;

/// The host CPU architecture, as packages declare it (`x86_64`, `aarch64`).
///
/// Matches `std::env::consts::ARCH`, which is the same vocabulary
/// `uname -m` uses on the platforms this tool targets.
pub fn host_arch() -> &'static str {
    std::env::consts::ARCH
}

/// The host distribution name, from `/etc/os-release`.
///
/// Returns an empty string when the host has no os-release file (packages
/// that gate on distribution then fail the check unless forced, which is the
/// conservative outcome).
pub fn host_distro() -> String {
    read_distro_from(Path::new("/etc/os-release"))
}

fn read_distro_from(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(content) => parse_os_release_name(&content).unwrap_or_default(),
        Err(_) => String::new(),
    }
}

/// Extract the `NAME` field from an os-release document.
///
/// Values may be quoted per the freedesktop spec; quotes are stripped.
fn parse_os_release_name(content: &str) -> Option<String> {
    for line in content.lines() {
        let line = line.trim();
        if let Some(value) = line.strip_prefix("NAME=") {
            return Some(value.trim_matches('"').trim_matches('\'').to_string());
        }
    }
    None
}
