//! Platform compatibility gate.
//!
//! Packages declare the architectures and distributions they support;
//! either list may be absent (treated as supported, with a warning) or the
//! sentinel `["all"]`. The gate only reports; deciding what a failure means
//! (`--force` downgrade, state cleanup, abort) belongs to the orchestrator.

use std::fmt;
use std::path::Path;

use avalon_schema::{PackageMetadata, host_arch, host_distro};

/// Which platform constraint a package failed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// The host CPU architecture is not in the package's `arches` list.
    CpuArchitecture,
    /// The host distribution is not in the package's `distros` list.
    Distribution,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CpuArchitecture => write!(f, "CPU architecture"),
            Self::Distribution => write!(f, "distribution"),
        }
    }
}

/// Outcome of checking a package against the host platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCheck {
    /// Every declared constraint is satisfied (or undeclared).
    Supported,
    /// A declared constraint is not satisfied by the host.
    Unsupported {
        /// The failed constraint.
        constraint: Constraint,
        /// The host's actual value.
        value: String,
    },
}

/// Check the package's declared platform support against this host.
pub fn check(metadata: &PackageMetadata) -> PlatformCheck {
    check_against(metadata, host_arch(), &host_distro())
}

/// Check against explicit host values. Architecture is gated first; the
/// distribution list is only consulted once the architecture passes.
pub fn check_against(metadata: &PackageMetadata, arch: &str, distro: &str) -> PlatformCheck {
    match &metadata.arches {
        Some(arches) => {
            if !list_allows(arches, arch) {
                return PlatformCheck::Unsupported {
                    constraint: Constraint::CpuArchitecture,
                    value: arch.to_string(),
                };
            }
        }
        None => {
            tracing::warn!("supported arches not specified, assuming this arch is supported");
        }
    }

    match &metadata.distros {
        Some(distros) => {
            if !list_allows(distros, distro) {
                return PlatformCheck::Unsupported {
                    constraint: Constraint::Distribution,
                    value: distro.to_string(),
                };
            }
        }
        None => {
            tracing::warn!("supported distros not specified, assuming this distro is supported");
        }
    }

    PlatformCheck::Supported
}

fn list_allows(list: &[String], value: &str) -> bool {
    list == ["all"] || list.iter().any(|entry| entry == value)
}

/// Whether package installs must stay inside the user prefix on this host.
///
/// Detected the way the original tooling does: a portage tree marks a host
/// whose system Python prefix must not be written to.
pub fn is_user_install_host() -> bool {
    Path::new("/etc/portage").exists()
}

/// Whether this username runs elevated commands through sudo.
///
/// Root does not; neither does an unprivileged mobile-shell user (Android
/// app users are named `u0_aNNN` and have no sudo at all).
pub fn requires_sudo(username: &str) -> bool {
    username != "root" && !username.starts_with("u0_a")
}

/// The invoking user's name, from the environment.
pub fn current_username() -> String {
    std::env::var("USER").unwrap_or_else(|_| "root".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(arches: Option<&[&str]>, distros: Option<&[&str]>) -> PackageMetadata {
        PackageMetadata {
            arches: arches.map(|l| l.iter().map(ToString::to_string).collect()),
            distros: distros.map(|l| l.iter().map(ToString::to_string).collect()),
            ..PackageMetadata::default()
        }
    }

    #[test]
    fn test_all_sentinel_always_satisfies() {
        let m = meta(Some(&["all"]), Some(&["all"]));
        assert_eq!(check_against(&m, "aarch64", "Gentoo"), PlatformCheck::Supported);
        assert_eq!(check_against(&m, "riscv64", ""), PlatformCheck::Supported);
    }

    #[test]
    fn test_arch_mismatch_fails_on_architecture() {
        let m = meta(Some(&["x86_64"]), Some(&["all"]));
        assert_eq!(
            check_against(&m, "aarch64", "Debian GNU/Linux"),
            PlatformCheck::Unsupported {
                constraint: Constraint::CpuArchitecture,
                value: "aarch64".to_string(),
            }
        );
    }

    #[test]
    fn test_distro_checked_after_arch_passes() {
        let m = meta(Some(&["x86_64"]), Some(&["Gentoo"]));
        assert_eq!(
            check_against(&m, "x86_64", "Debian GNU/Linux"),
            PlatformCheck::Unsupported {
                constraint: Constraint::Distribution,
                value: "Debian GNU/Linux".to_string(),
            }
        );
        assert_eq!(check_against(&m, "x86_64", "Gentoo"), PlatformCheck::Supported);
    }

    #[test]
    fn test_absent_fields_pass() {
        let m = meta(None, None);
        assert_eq!(check_against(&m, "aarch64", "Alpine"), PlatformCheck::Supported);
    }

    #[test]
    fn test_constraint_display_names() {
        assert_eq!(Constraint::CpuArchitecture.to_string(), "CPU architecture");
        assert_eq!(Constraint::Distribution.to_string(), "distribution");
    }

    #[test]
    fn test_sudo_elevation_rule() {
        assert!(requires_sudo("alice"));
        assert!(!requires_sudo("root"));
        assert!(!requires_sudo("u0_a117"));
    }
}
