//! avalon - a source-based package manager
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! # Overview
//!
//! Avalon installs packages straight from their hosted source repositories:
//! it resolves the package's declared metadata, installs declared
//! dependencies (system, recursive avalon, pip), runs the package's own
//! build and install scripts, and publishes the result as a symlink on
//! `$PATH`.
//!
//! # Architecture
//!
//! - **Explicit context**: all per-invocation state (paths, resolver,
//!   console, flags, the in-progress set guarding recursive installs)
//!   travels in `ops::Context` — nothing global, nothing mutable-shared.
//! - **Ordered resolution**: metadata lookup is a fixed list of sources
//!   tried in order, local first.
//! - **Filesystem state**: a package is installed iff its installation
//!   record under `files/<package>` exists and parses.

pub mod cmd;
pub mod ops;
pub mod ui;

pub use ops::{Context, Flags};
pub use ui::Console;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "avalon")]
#[command(author, version, about = "avalon - a source-based package manager")]
pub struct Cli {
    /// Reinstall avalon dependencies even when already installed
    #[arg(short = 'U', long, global = true)]
    pub update: bool,

    /// Reinstall from a fresh clone instead of updating
    #[arg(short = 'F', long, global = true)]
    pub fresh: bool,

    /// Continue past unmet platform constraints
    #[arg(short = 'f', long, global = true)]
    pub force: bool,

    /// Only download, skip compilation and installation (debug)
    #[arg(long, global = true)]
    pub noinstall: bool,

    /// Print debug output
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install packages from their source repositories
    Install {
        /// Package identifiers (owner/repo, owner/repo:commit,
        /// owner/repo/branch) or local archive/directory paths
        #[arg(required = true)]
        targets: Vec<String>,
    },
    /// Uninstall packages
    Uninstall {
        /// Package identifiers
        #[arg(required = true)]
        packages: Vec<String>,
    },
    /// Update packages to the newest commit, then rebuild and reinstall
    Update {
        /// Package identifiers
        #[arg(required = true)]
        packages: Vec<String>,
    },
    /// Regenerate the binary symlink for a package without recompiling
    Redobin {
        /// Package identifier
        package: String,
    },
    /// List installed packages with their versions
    List,
    /// Refresh the metadata registry mirror
    Refresh,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}
