//! Core library for Avalon, a source-based package manager.
//!
//! # Directory Layout
//!
//! ```text
//! ~/.cache/avalon/
//! ├── src/        # Per-package source checkouts
//! └── cache/      # Local mirror of the central metadata registry
//! ~/.config/avalon/
//! ├── bin/        # User-facing symlinks, on $PATH
//! └── files/      # Per-package published artifacts
//! $TMPDIR/avalon/ # Scratch space for archive-based installs
//! ```
//!
//! A package is installed iff `files/<package>` holds a parseable
//! installation record; `bin/<binname>` is always a symlink into
//! `files/<package>`, never a copy.

pub mod case;
pub mod error;
pub mod fsutil;
pub mod git;
pub mod ident;
pub mod metadata;
pub mod paths;
pub mod platform;
pub mod record;
pub mod script;

pub use error::InstallError;
pub use ident::PackageIdentifier;
pub use metadata::MetadataResolver;
pub use paths::Paths;
pub use record::InstallationRecord;

/// User agent sent with remote metadata fetches.
pub const USER_AGENT: &str = concat!("avalon/", env!("CARGO_PKG_VERSION"));
