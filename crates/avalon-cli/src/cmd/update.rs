use anyhow::Result;

use crate::ops::{self, Context};

/// Update each package in order.
pub fn update(ctx: &mut Context, packages: &[String]) -> Result<()> {
    for package in packages {
        ops::update::update_package(ctx, package)?;
    }
    Ok(())
}
