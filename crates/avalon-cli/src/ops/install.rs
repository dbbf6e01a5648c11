//! Package installation.
//!
//! The state machine per package is `Absent → Checked-Out → Compiled →
//! Published → Absent`. An argument naming an existing local path is an
//! archive/directory install; otherwise the identifier is parsed, and an
//! existing checkout without `--fresh` redirects to the update flow. The
//! installation record is written last, so a crash anywhere in the pipeline
//! leaves the package observably not-installed.

use std::path::Path;

use avalon_core::platform::PlatformCheck;
use avalon_core::{
    InstallError, InstallationRecord, PackageIdentifier, fsutil, git, metadata, platform, script,
};
use avalon_schema::PackageMetadata;

use super::context::Context;

/// Install a package by identifier or local path.
///
/// # Errors
///
/// Fatal conditions per the pipeline's error taxonomy: unresolvable
/// metadata, unmet platform constraints (unless forced), failing scripts or
/// subprocesses, and dependency cycles.
pub fn install_package(ctx: &mut Context, target: &str) -> Result<(), InstallError> {
    if Path::new(target).exists() {
        return install_local(ctx, Path::new(target));
    }

    let ident: PackageIdentifier = target.parse()?;
    let name = ident.dir_name();

    if !ctx.in_progress.insert(name.clone()) {
        return Err(InstallError::DependencyCycle(name));
    }

    let result = if ctx.paths.checkout_dir(&name).exists() && !ctx.flags.fresh {
        super::update::update_checkout(ctx, &ident)
    } else {
        install_fresh(ctx, &ident)
    };

    ctx.in_progress.remove(&name);
    result
}

fn install_fresh(ctx: &mut Context, ident: &PackageIdentifier) -> Result<(), InstallError> {
    let name = ident.dir_name();

    ctx.console.note("Deleting old binaries and source files.....");
    delete_package_state(&ctx.paths, &name, None);

    ctx.console.note("Downloading from github.....");
    let dest = ctx.paths.checkout_dir(&name);
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let url = ident.clone_url();
    if let Some(commit) = &ident.commit {
        git::clone_full(&url, &dest)?;
        git::hard_reset(&dest, Some(commit))?;
    } else if let Some(branch) = &ident.branch {
        git::clone_branch(&url, &dest, branch)?;
    } else {
        git::clone_shallow(&url, &dest)?;
    }

    adopt_registry_metadata(ctx, &name)?;
    finalize(ctx, ident)
}

/// Archive or directory install: unpack into scratch space, learn the true
/// package name from the embedded metadata, then continue as a normal
/// install from the delete-prior-state step.
fn install_local(ctx: &mut Context, source: &Path) -> Result<(), InstallError> {
    let staging = ctx.paths.temp.clone();
    fsutil::remove_dir_all_quiet(&staging);
    std::fs::create_dir_all(&staging)?;

    ctx.console.note("Unpacking package.....");
    if source.is_dir() {
        fsutil::copy_tree(source, &staging)?;
    } else {
        unpack_archive(source, &staging)?;
    }

    let meta = PackageMetadata::from_file(&staging.join(".avalon").join("package"))
        .map_err(|e| InstallError::Validation(format!("local package has no readable metadata: {e}")))?;
    let (Some(author), Some(repo)) = (&meta.author, &meta.repo) else {
        return Err(InstallError::Validation(
            "the package's metadata needs 'author' and 'repo'".to_string(),
        ));
    };
    let ident = PackageIdentifier::parse(&format!("{author}/{repo}"))?;
    let name = ident.dir_name();

    ctx.console.note("Deleting old binaries and source files.....");
    delete_package_state(&ctx.paths, &name, meta.binname.as_deref());

    ctx.console.note("Copying package files.....");
    let checkout = ctx.paths.checkout_dir(&name);
    std::fs::create_dir_all(&checkout)?;
    fsutil::copy_tree(&staging, &checkout)?;
    fsutil::remove_dir_all_quiet(&staging);

    finalize(ctx, &ident)
}

fn unpack_archive(archive: &Path, dest: &Path) -> Result<(), InstallError> {
    let file = std::fs::File::open(archive)?;
    // .apm archives are gzipped tars under another name.
    let gzipped = matches!(
        archive.extension().and_then(|e| e.to_str()),
        Some("gz" | "tgz" | "apm")
    );
    let unpacked = if gzipped {
        tar::Archive::new(flate2::read::GzDecoder::new(file)).unpack(dest)
    } else {
        tar::Archive::new(file).unpack(dest)
    };
    unpacked.map_err(|e| {
        InstallError::Validation(format!("error unpacking package, not a tar archive: {e}"))
    })
}

/// When the checkout does not describe itself, give it the registry's
/// metadata: sync the mirror if it was never cloned, then copy the
/// package's registry entry into the checkout's `.avalon` directory.
pub(crate) fn adopt_registry_metadata(ctx: &mut Context, name: &str) -> Result<(), InstallError> {
    if metadata::is_self_describing(&ctx.paths, name) {
        tracing::debug!("{name} describes itself, keeping its own metadata");
        return Ok(());
    }

    metadata::ensure_mirror(&ctx.paths);

    if metadata::is_in_registry(&ctx.paths, name) {
        ctx.console.note(
            "Package is not self-describing, but it is in the registry... installing with registry metadata.....",
        );
        metadata::copy_registry_metadata(&ctx.paths, name)?;
    } else {
        tracing::debug!("{name} is not in the registry");
    }
    Ok(())
}

/// The shared tail of every install-like flow: resolve metadata, gate on
/// the platform, install dependencies, then compile, publish, and record.
pub(crate) fn finalize(ctx: &mut Context, ident: &PackageIdentifier) -> Result<(), InstallError> {
    let name = ident.dir_name();
    let meta = ctx.resolver.resolve(&ctx.paths, ident)?;

    enforce_platform(ctx, &name, &meta)?;
    super::deps::install_all(ctx, &name, &meta)?;

    if ctx.flags.noinstall {
        ctx.console.warn("--noinstall specified, skipping compilation and installation");
        return Ok(());
    }

    ctx.console.note("Beginning compilation/installation.....");
    compile_and_publish(ctx, &name, &meta)?;

    let binary = meta
        .binname
        .as_deref()
        .map(|b| ctx.paths.publish_dir(&name).join(fsutil::file_name_of(b)));
    InstallationRecord::new(&name, meta.version.clone(), binary).write(&ctx.paths)?;

    ctx.console.success("Done!");
    Ok(())
}

/// Run the platform gate for an install. `--force` downgrades a failure to
/// a warning; otherwise partially-created package state is deleted and the
/// failure is fatal, naming the unmet constraint and the host's value.
pub(crate) fn enforce_platform(
    ctx: &mut Context,
    name: &str,
    meta: &PackageMetadata,
) -> Result<(), InstallError> {
    match platform::check(meta) {
        PlatformCheck::Supported => Ok(()),
        PlatformCheck::Unsupported { constraint, value } => {
            if ctx.flags.force {
                ctx.console.warn(&format!(
                    "{constraint} {value} not supported by package, continuing anyway due to forced mode"
                ));
                Ok(())
            } else {
                delete_package_state(&ctx.paths, name, meta.binname.as_deref());
                Err(InstallError::UnsupportedPlatform { constraint, value })
            }
        }
    }
}

/// Remove every on-disk trace of a package: the published-binary symlink
/// (from the given binname and from the record, whichever is known), the
/// checkout, and the publish directory.
pub(crate) fn delete_package_state(
    paths: &avalon_core::Paths,
    name: &str,
    binname: Option<&str>,
) {
    if let Some(binname) = binname {
        fsutil::remove_file_quiet(&paths.binary_link(binname));
    }
    if let Some(record) = InstallationRecord::load(paths, name) {
        if let Some(binary) = &record.binary {
            if let Some(link_name) = binary.file_name() {
                fsutil::remove_file_quiet(&paths.binaries.join(link_name));
            }
        }
    }
    fsutil::remove_dir_all_quiet(&paths.checkout_dir(name));
    fsutil::remove_dir_all_quiet(&paths.publish_dir(name));
}

fn compile_and_publish(
    ctx: &mut Context,
    name: &str,
    meta: &PackageMetadata,
) -> Result<(), InstallError> {
    let source_dir = ctx.paths.checkout_dir(name);
    let publish_dir = ctx.paths.publish_dir(name);
    std::fs::create_dir_all(&publish_dir)?;

    if meta.needs_compiled() {
        if meta.binname.is_none() {
            ctx.console.warn(
                "Package needs compiled but there is no binname to publish, assuming it is installed by the compile script.....",
            );
        }
        let Some(compile_script) = &meta.compile_script else {
            return Err(InstallError::Validation(
                "program needs compiling but no compilation script was found".to_string(),
            ));
        };
        ctx.console.note("Compile script found, compiling.....");
        script::run_script(
            &source_dir.join(compile_script),
            &[
                source_dir.display().to_string(),
                meta.binname.clone().unwrap_or_default(),
                publish_dir.display().to_string(),
            ],
            &source_dir,
        )?;
    } else {
        ctx.console.warn("Program does not need to be compiled, moving to installation.....");
    }

    if meta.binname.is_some() && !meta.mv_bin_after_install_script() {
        publish_binary(&ctx.paths, name, meta)?;
    }

    if let Some(install_script) = &meta.install_script {
        ctx.console.note("Installing.....");
        let args = if meta.has_binary_context() {
            let binname = meta.binname.as_deref().unwrap_or_default();
            vec![
                publish_dir.join(fsutil::file_name_of(binname)).display().to_string(),
                publish_dir.display().to_string(),
                ctx.paths.binaries.display().to_string(),
                ctx.paths.source.display().to_string(),
            ]
        } else {
            vec![
                publish_dir.display().to_string(),
                ctx.paths.source.display().to_string(),
                name.to_string(),
            ]
        };
        script::run_script(&source_dir.join(install_script), &args, &source_dir)?;
    } else {
        ctx.console.warn(
            "No installation script found... Assuming installation beyond the autoinstaller isn't necessary",
        );
    }

    copy_declared_files(ctx, name, meta)?;

    if meta.mv_bin_after_install_script() && meta.binname.is_some() {
        publish_binary(&ctx.paths, name, meta)?;
    }

    Ok(())
}

/// Copy the package's declared extra files into the publish directory.
/// An absent `toCopy` (or the `["all"]` sentinel) publishes every top-level
/// entry of the checkout.
fn copy_declared_files(
    ctx: &mut Context,
    name: &str,
    meta: &PackageMetadata,
) -> Result<(), InstallError> {
    let source_dir = ctx.paths.checkout_dir(name);
    let publish_dir = ctx.paths.publish_dir(name);

    let entries: Vec<String> = match &meta.to_copy {
        Some(list) if list.as_slice() != ["all"] => list.clone(),
        _ => {
            let mut all = Vec::new();
            for entry in std::fs::read_dir(&source_dir)? {
                all.push(entry?.file_name().to_string_lossy().to_string());
            }
            all
        }
    };
    if entries.is_empty() {
        return Ok(());
    }

    ctx.console.note("Copying files needed by the program.....");
    for entry in entries {
        fsutil::copy_path(&source_dir.join(&entry), &publish_dir.join(&entry))?;
    }
    Ok(())
}

/// Publish a package's binary: best-effort copy of the built artifact from
/// the checkout into the publish directory (a compile script may already
/// have put it there), mark it executable, and point `binaries/<binname>`
/// at it.
pub(crate) fn publish_binary(
    paths: &avalon_core::Paths,
    name: &str,
    meta: &PackageMetadata,
) -> Result<(), InstallError> {
    let Some(binname) = meta.binname.as_deref() else {
        return Err(InstallError::Validation(format!(
            "package '{name}' declares no binname to publish"
        )));
    };

    let link_name = fsutil::file_name_of(binname);
    let built = paths
        .checkout_dir(name)
        .join(meta.effective_binfile().unwrap_or(binname));
    let published = paths.publish_dir(name).join(link_name);

    if let Some(parent) = published.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if built.is_file() {
        std::fs::copy(&built, &published)?;
    } else {
        tracing::debug!("no built artifact at {}, assuming the scripts published it", built.display());
    }
    fsutil::make_executable(&published);
    fsutil::replace_symlink(&published, &paths.binary_link(binname))?;
    Ok(())
}
