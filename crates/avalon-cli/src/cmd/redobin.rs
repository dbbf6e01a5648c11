use anyhow::Result;

use crate::ops::{self, Context};

/// Regenerate the binary symlink for a package.
pub fn redobin(ctx: &mut Context, package: &str) -> Result<()> {
    ops::redobin::redo_symlinks(ctx, package)?;
    Ok(())
}
