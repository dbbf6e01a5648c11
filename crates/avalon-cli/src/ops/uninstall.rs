//! Package uninstallation.
//!
//! Cleanup is best-effort and always completes: a failing uninstall script
//! is logged as an error but never prevents the deletion of the checkout,
//! the published files, and the binary symlink.

use avalon_core::platform::PlatformCheck;
use avalon_core::{InstallError, PackageIdentifier, platform, script};

use super::context::Context;

/// Uninstall a package.
///
/// # Errors
///
/// Fatal when metadata cannot be resolved or the platform gate fails
/// without `--force`. A failing uninstall script is NOT fatal.
pub fn uninstall_package(ctx: &mut Context, target: &str) -> Result<(), InstallError> {
    let ident: PackageIdentifier = target.parse()?;
    let name = ident.dir_name();

    super::install::adopt_registry_metadata(ctx, &name)?;

    let meta = ctx.resolver.resolve(&ctx.paths, &ident)?;

    if let PlatformCheck::Unsupported { constraint, value } = platform::check(&meta) {
        if ctx.flags.force {
            ctx.console.warn(&format!(
                "{constraint} {value} not supported by package, continuing anyway due to forced mode"
            ));
        } else {
            return Err(InstallError::UnsupportedPlatform { constraint, value });
        }
    }

    ctx.console.note("Uninstalling.....");
    match &meta.uninstall_script {
        None => {
            ctx.console.warn(
                "Uninstall script not found... Assuming uninstall not required and deleting files.....",
            );
        }
        Some(uninstall_script) => {
            ctx.console.note("Uninstall script found, running.....");
            let script_path = ctx.paths.checkout_dir(&name).join(uninstall_script);
            let args = vec![
                ctx.paths.source.display().to_string(),
                ctx.paths.binaries.display().to_string(),
                name.clone(),
                meta.binname.clone().unwrap_or_default(),
                ctx.paths.publish_dir(&name).display().to_string(),
            ];
            if let Err(e) = script::run_script(&script_path, &args, &ctx.paths.binaries) {
                ctx.console
                    .error(&format!("Uninstall script failed ({e})! Deleting files anyways....."));
            }
        }
    }

    super::install::delete_package_state(&ctx.paths, &name, meta.binname.as_deref());
    ctx.console.success("Successfully uninstalled package!");
    Ok(())
}
