//! Shared types and wire format for Avalon.
//!
//! The single wire format in the system is the package metadata file: a JSON
//! object stored at `.avalon/package` inside a checkout, or at
//! `<mirror>/<package>/package` inside the registry mirror. This crate owns
//! that format plus the host platform probes the compatibility gate reads.

pub mod metadata;
pub mod platform;

pub use metadata::{DependencyMap, MetadataError, PackageMetadata};
pub use platform::{host_arch, host_distro};
