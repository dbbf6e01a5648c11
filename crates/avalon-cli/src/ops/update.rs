//! Package update: pull the existing checkout, then rebuild and reinstall.

use avalon_core::{InstallError, PackageIdentifier, git};

use super::context::Context;

/// Update a package to the newest commit of its checkout, then recompile
/// and reinstall it.
///
/// # Errors
///
/// Fatal when the checkout is missing, both pull attempts fail, or any
/// later pipeline step fails.
pub fn update_package(ctx: &mut Context, target: &str) -> Result<(), InstallError> {
    let ident: PackageIdentifier = target.parse()?;
    let name = ident.dir_name();

    if !ctx.in_progress.insert(name.clone()) {
        return Err(InstallError::DependencyCycle(name));
    }
    let result = update_checkout(ctx, &ident);
    ctx.in_progress.remove(&name);
    result
}

/// The update flow proper. Pull, falling back to hard-reset-then-pull on
/// conflict; from there the pipeline is identical to an install from the
/// metadata-copy step onward.
pub(crate) fn update_checkout(
    ctx: &mut Context,
    ident: &PackageIdentifier,
) -> Result<(), InstallError> {
    let name = ident.dir_name();
    let checkout = ctx.paths.checkout_dir(&name);
    if !checkout.exists() {
        return Err(InstallError::Validation(format!(
            "package '{name}' has no checkout to update"
        )));
    }

    ctx.console.note("Pulling from github.....");
    if git::pull(&checkout).is_err() {
        git::hard_reset(&checkout, None)?;
        git::pull(&checkout)?;
    }

    super::install::adopt_registry_metadata(ctx, &name)?;
    super::install::finalize(ctx, ident)
}
