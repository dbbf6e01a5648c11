//! User-facing terminal output.

pub mod console;

pub use console::{Console, Verbosity};
