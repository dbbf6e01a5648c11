//! Shared operation context.
//!
//! Groups the state every operation needs — paths, the metadata resolver,
//! the console, the invocation flags — so it travels as one explicit value
//! instead of process-wide state. The in-progress set guards the one
//! recursion point in the system (avalon-kind dependencies) against cycles.

use std::collections::HashSet;

use avalon_core::{MetadataResolver, Paths};

use crate::ui::Console;

/// Invocation flags shared by every operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Flags {
    /// Reinstall from a fresh clone instead of updating.
    pub fresh: bool,
    /// Continue past unmet platform constraints.
    pub force: bool,
    /// Reinstall avalon dependencies even when already installed.
    pub update: bool,
    /// Only download, skip compilation and installation.
    pub noinstall: bool,
}

/// Per-invocation state, threaded through every operation.
#[derive(Debug)]
pub struct Context {
    /// The process-wide directory layout.
    pub paths: Paths,
    /// Metadata resolution, local sources first.
    pub resolver: MetadataResolver,
    /// Status output; swapped for a quiet clone during recursive installs.
    pub console: Console,
    /// Invocation flags.
    pub flags: Flags,
    /// Lower-cased names of packages currently being installed, for
    /// fail-fast dependency-cycle detection.
    pub in_progress: HashSet<String>,
    /// Lazily cached listing of installed system packages; the system
    /// package manager is queried at most once per invocation.
    pub apt_installed: Option<Vec<String>>,
}

impl Context {
    /// Build a context for one invocation.
    pub fn new(paths: Paths, resolver: MetadataResolver, console: Console, flags: Flags) -> Self {
        Self {
            paths,
            resolver,
            console,
            flags,
            in_progress: HashSet::new(),
            apt_installed: None,
        }
    }
}
