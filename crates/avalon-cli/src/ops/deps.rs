//! Dependency installation.
//!
//! Up to four dependency kinds are processed per package, each skippable,
//! in a significant order: system packages first, then recursive avalon
//! packages, then pip packages, then a `requirements.txt` fallback scan —
//! later steps may depend on earlier ones having provided compilers or
//! libraries.

use std::path::Path;
use std::process::Command;

use avalon_core::{InstallError, InstallationRecord, PackageIdentifier, platform};
use avalon_schema::PackageMetadata;

use super::context::Context;

/// Install every declared dependency of a package, then scan for a
/// `requirements.txt` in its checkout.
///
/// # Errors
///
/// Fatal when any underlying package manager or recursive install fails.
pub fn install_all(
    ctx: &mut Context,
    name: &str,
    meta: &PackageMetadata,
) -> Result<(), InstallError> {
    let deps = meta.deps();
    if !deps.is_empty() {
        ctx.console.note("Found dependencies, installing.....");
        if has_usable_apt() {
            install_apt(ctx, &deps.apt)?;
            install_build_dep(ctx, &deps.build_dep)?;
        }
        install_avalon(ctx, &deps.avalon)?;
        install_pip(ctx, &deps.pip)?;
    }
    install_requirements_txt(ctx, name)
}

/// Whether the host has a real `apt`. Gentoo ships a java wrapper that is
/// also named `apt`, so its marker rules the binary out.
fn has_usable_apt() -> bool {
    which::which("apt").is_ok()
        && !Path::new("/usr/libexec/eselect-java/run-java-tool.bash").exists()
}

/// Extract installed package names from `dpkg -l` output. Only `ii` rows
/// are installed; the architecture suffix (`name:amd64`) is dropped so the
/// names compare against declared dependencies.
pub fn parse_dpkg_listing(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| line.starts_with("ii"))
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(|name| name.split(':').next().unwrap_or(name).to_string())
        .collect()
}

fn installed_system_packages(ctx: &mut Context) -> Result<Vec<String>, InstallError> {
    if let Some(cached) = &ctx.apt_installed {
        return Ok(cached.clone());
    }

    let output = Command::new("dpkg").arg("-l").output()?;
    if !output.status.success() {
        return Err(InstallError::Subprocess {
            command: "dpkg -l".to_string(),
            code: output.status.code().unwrap_or(-1),
        });
    }

    let installed = parse_dpkg_listing(&String::from_utf8_lossy(&output.stdout));
    ctx.apt_installed = Some(installed.clone());
    Ok(installed)
}

fn install_apt(ctx: &mut Context, deps: &[String]) -> Result<(), InstallError> {
    if deps.is_empty() {
        return Ok(());
    }

    let installed = installed_system_packages(ctx)?;
    let missing: Vec<&str> = deps
        .iter()
        .filter(|dep| !installed.iter().any(|have| have == *dep))
        .map(String::as_str)
        .collect();
    if missing.is_empty() {
        return Ok(());
    }

    ctx.console
        .note("Found apt dependencies, installing..... (this may require your password)");
    let mut args = vec!["install", "-y"];
    args.extend_from_slice(&missing);
    run_elevated("apt", &args)
}

fn install_build_dep(ctx: &mut Context, deps: &[String]) -> Result<(), InstallError> {
    if deps.is_empty() {
        return Ok(());
    }

    ctx.console
        .note("Found build-dep (apt) dependencies, installing..... (this may require your password)");
    let mut args = vec!["build-dep", "-y"];
    args.extend(deps.iter().map(String::as_str));
    run_elevated("apt", &args)
}

/// Install recursive avalon dependencies. A dependency with an
/// installation record is skipped unless `--update` was passed; each
/// install re-enters the full orchestrator with a quieted console.
///
/// # Errors
///
/// Fatal when a recursive install fails, including on a dependency cycle.
pub fn install_avalon(ctx: &mut Context, deps: &[String]) -> Result<(), InstallError> {
    if deps.is_empty() {
        return Ok(());
    }

    ctx.console.note("Found avalon dependencies, installing.....");
    for dep in deps {
        let ident: PackageIdentifier = dep.parse()?;
        let name = ident.dir_name();

        if InstallationRecord::exists(&ctx.paths, &name) && !ctx.flags.update {
            tracing::debug!("{name} is already installed, skipping");
            continue;
        }

        ctx.console.note(&format!("Installing {dep}"));
        let quiet = ctx.console.quieted();
        let saved = std::mem::replace(&mut ctx.console, quiet);
        let result = super::install::install_package(ctx, dep);
        ctx.console = saved;
        result?;
        ctx.console.note(&format!("Installed {dep}"));
    }
    Ok(())
}

fn install_pip(ctx: &mut Context, deps: &[String]) -> Result<(), InstallError> {
    if deps.is_empty() {
        return Ok(());
    }

    ctx.console.note("Found pip dependencies, installing.....");
    let mut args = vec!["-m", "pip", "install"];
    if platform::is_user_install_host() {
        args.push("--user");
    }
    args.extend(deps.iter().map(String::as_str));
    run_command("python3", &args)
}

/// Fallback scan: a `requirements.txt` in the checkout is installed even
/// when the metadata declares no pip dependencies.
pub fn install_requirements_txt(ctx: &mut Context, name: &str) -> Result<(), InstallError> {
    let requirements = ctx.paths.checkout_dir(name).join("requirements.txt");
    if !requirements.exists() {
        return Ok(());
    }

    ctx.console.note("Requirements.txt found, installing.....");
    let requirements = requirements.display().to_string();
    let mut args = vec!["-m", "pip", "--disable-pip-version-check", "-q", "install"];
    if platform::is_user_install_host() {
        args.push("--user");
    }
    args.push("-r");
    args.push(&requirements);
    run_command("python3", &args)
}

/// Run a system command, elevating through sudo unless the invoking user is
/// root or an unprivileged mobile-shell user.
fn run_elevated(program: &str, args: &[&str]) -> Result<(), InstallError> {
    if platform::requires_sudo(&platform::current_username()) {
        let mut sudo_args = vec![program];
        sudo_args.extend_from_slice(args);
        run_command("sudo", &sudo_args)
    } else {
        run_command(program, args)
    }
}

fn run_command(program: &str, args: &[&str]) -> Result<(), InstallError> {
    tracing::debug!("{program} {}", args.join(" "));

    let status = Command::new(program).args(args).status()?;
    if status.success() {
        Ok(())
    } else {
        Err(InstallError::Subprocess {
            command: format!("{program} {}", args.join(" ")),
            code: status.code().unwrap_or(-1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dpkg_listing() {
        let output = "\
Desired=Unknown/Install/Remove/Purge/Hold
||/ Name                Version        Architecture Description
+++-===================-==============-============-=================================
ii  curl                7.88.1-10      amd64        command line tool for transferring data
ii  libssl-dev:amd64    3.0.9-1        amd64        Secure Sockets Layer toolkit
rc  removed-pkg         1.0-1          amd64        formerly installed
";
        let installed = parse_dpkg_listing(output);
        assert_eq!(installed, vec!["curl", "libssl-dev"]);
    }

    #[test]
    fn test_parse_dpkg_listing_empty() {
        assert!(parse_dpkg_listing("").is_empty());
    }
}
