use anyhow::Result;

use avalon_core::metadata;

use crate::ops::Context;

/// Re-sync the metadata registry mirror.
pub fn refresh(ctx: &Context) -> Result<()> {
    metadata::sync_mirror(&ctx.paths)?;
    ctx.console.success("Refreshed the registry mirror.");
    Ok(())
}
