//! Domain errors for the install/uninstall pipeline.
//!
//! Locally recoverable conditions (a malformed metadata source, a missing
//! optional field) are absorbed and logged where they occur; everything that
//! would leave a package in an inconsistent installed state surfaces here
//! and aborts the command.

use thiserror::Error;

use crate::ident::IdentError;
use crate::platform::Constraint;

/// Fatal errors for install-path operations.
#[derive(Error, Debug)]
pub enum InstallError {
    /// No source yielded parseable metadata for the package.
    #[error("no usable metadata for package '{0}' in any source")]
    MetadataUnavailable(String),

    /// The host fails a declared architecture or distribution constraint.
    #[error("{constraint} '{value}' is not supported by this package")]
    UnsupportedPlatform {
        /// Which constraint failed.
        constraint: Constraint,
        /// The host's actual value for that constraint.
        value: String,
    },

    /// A build or install script returned nonzero.
    #[error("script '{script}' failed with exit code {code}")]
    Script {
        /// The script path as invoked.
        script: String,
        /// The script's exit code (`-1` when killed by a signal).
        code: i32,
    },

    /// An external command (git, apt, pip) failed.
    #[error("'{command}' exited with code {code}")]
    Subprocess {
        /// The command that failed.
        command: String,
        /// Its exit code (`-1` when killed by a signal).
        code: i32,
    },

    /// A package is already being installed further up the recursion.
    #[error("dependency cycle detected: '{0}' is already being installed")]
    DependencyCycle(String),

    /// The package identifier could not be parsed.
    #[error(transparent)]
    Ident(#[from] IdentError),

    /// A declared requirement of the operation is not met.
    #[error("{0}")]
    Validation(String),

    /// An I/O error outside any more specific context.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An HTTP transport error during metadata resolution.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
