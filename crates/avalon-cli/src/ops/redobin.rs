//! Symlink repair: recreate a package's `$PATH` entry without recompiling.

use avalon_core::{InstallError, PackageIdentifier, fsutil};

use super::context::Context;

/// Remove and recreate the binary symlink for an installed package.
///
/// # Errors
///
/// Fatal when metadata cannot be resolved or the package declares no
/// binary to publish.
pub fn redo_symlinks(ctx: &mut Context, target: &str) -> Result<(), InstallError> {
    let ident: PackageIdentifier = target.parse()?;
    let name = ident.dir_name();

    let meta = ctx.resolver.resolve(&ctx.paths, &ident)?;
    let Some(binname) = meta.binname.as_deref() else {
        return Err(InstallError::Validation(format!(
            "package '{name}' declares no binname to publish"
        )));
    };

    fsutil::remove_file_quiet(&ctx.paths.binary_link(binname));
    super::install::publish_binary(&ctx.paths, &name, &meta)?;

    ctx.console.success(&format!("Recreated the symlink for {name}"));
    Ok(())
}
