use anyhow::Result;

use crate::ops::{self, Context};

/// Install each target in order.
pub fn install(ctx: &mut Context, targets: &[String]) -> Result<()> {
    for target in targets {
        ops::install::install_package(ctx, target)?;
    }
    Ok(())
}
