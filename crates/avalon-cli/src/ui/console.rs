//! Colored status output.
//!
//! The console is a value, not a global: every operation receives the one
//! it should print through. Recursive dependency installs get a `quieted()`
//! clone, which is how nested output is suppressed without any shared
//! mutable state. Errors always print, regardless of verbosity.

use crossterm::style::Stylize;

/// How much the console prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Only errors.
    Quiet,
    /// Notes, warnings, successes, and errors.
    Normal,
}

/// Status output handle, threaded explicitly through every operation.
#[derive(Debug, Clone)]
pub struct Console {
    verbosity: Verbosity,
}

impl Console {
    /// Create a console; `quiet` suppresses everything but errors.
    pub fn new(quiet: bool) -> Self {
        Self {
            verbosity: if quiet { Verbosity::Quiet } else { Verbosity::Normal },
        }
    }

    /// A clone of this console that only prints errors.
    pub fn quieted(&self) -> Self {
        Self {
            verbosity: Verbosity::Quiet,
        }
    }

    /// Whether non-error output is suppressed.
    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    /// Print a progress note.
    pub fn note(&self, msg: &str) {
        if !self.is_quiet() {
            println!("{}", msg.dark_cyan());
        }
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if !self.is_quiet() {
            println!("{}", msg.green());
        }
    }

    /// Print a warning.
    pub fn warn(&self, msg: &str) {
        if !self.is_quiet() {
            println!("{}", msg.yellow());
        }
    }

    /// Print an error. Always printed, to stderr.
    pub fn error(&self, msg: &str) {
        eprintln!("{}", msg.red());
    }
}
