use avalon_core::record;

use crate::ops::Context;

/// Print installed packages, one `owner/repo==version` per line.
pub fn list(ctx: &Context) {
    for line in record::list_installed(&ctx.paths) {
        println!("{line}");
    }
}
