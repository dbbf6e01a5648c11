use anyhow::Result;

use crate::ops::{self, Context};

/// Uninstall each package in order.
pub fn uninstall(ctx: &mut Context, packages: &[String]) -> Result<()> {
    for package in packages {
        ops::uninstall::uninstall_package(ctx, package)?;
    }
    Ok(())
}
