//! End-to-end install/uninstall flows against a temporary directory layout.
//!
//! Remote metadata resolution is pointed at an unroutable local port, so
//! every scenario here exercises the local sources only; network-dependent
//! steps (cloning nonexistent repositories) are expected to fail fast and
//! are used to observe which flow a call routed into.

use std::path::Path;

use avalon_cli::ops::{self, Context, Flags};
use avalon_cli::ui::Console;
use avalon_core::{InstallError, InstallationRecord, MetadataResolver, Paths};
use tempfile::TempDir;

fn test_context(root: &Path) -> Context {
    let paths = Paths::at(root);
    paths.ensure().unwrap();
    let resolver = MetadataResolver::with_raw_host(
        reqwest::blocking::Client::new(),
        "http://127.0.0.1:1",
    );
    Context::new(paths, resolver, Console::new(true), Flags::default())
}

fn write_package(dir: &Path, metadata: &str, files: &[(&str, &str)]) {
    std::fs::create_dir_all(dir.join(".avalon")).unwrap();
    std::fs::write(dir.join(".avalon/package"), metadata).unwrap();
    for (name, content) in files {
        std::fs::write(dir.join(name), content).unwrap();
    }
}

#[test]
fn install_from_directory_publishes_symlinked_binary() {
    let tmp = TempDir::new().unwrap();
    let mut ctx = test_context(&tmp.path().join("home"));

    // The compile script writes the binary straight into the publish
    // directory; publication must still symlink it.
    let pkg = tmp.path().join("pkg");
    write_package(
        &pkg,
        r#"{
            "author": "Demo", "repo": "Tool",
            "version": "1.0.0",
            "needsCompiled": true,
            "binname": "foo",
            "compileScript": "build.sh",
            "arches": ["all"], "distros": ["all"],
            "toCopy": []
        }"#,
        &[("build.sh", "printf '#!/bin/sh\\necho hi\\n' > \"$3/foo\"\n")],
    );

    ops::install::install_package(&mut ctx, pkg.to_str().unwrap()).unwrap();

    let link = ctx.paths.binaries.join("foo");
    let published = ctx.paths.publish_dir("demo/tool").join("foo");
    assert!(link.symlink_metadata().unwrap().is_symlink());
    assert_eq!(std::fs::read_link(&link).unwrap(), published);
    assert!(published.exists());

    let record = InstallationRecord::load(&ctx.paths, "demo/tool").unwrap();
    assert_eq!(record.version.as_deref(), Some("1.0.0"));
    assert_eq!(record.binary.as_deref(), Some(published.as_path()));
}

#[test]
fn failing_uninstall_script_still_removes_package_state() {
    let tmp = TempDir::new().unwrap();
    let mut ctx = test_context(&tmp.path().join("home"));

    let pkg = tmp.path().join("pkg");
    write_package(
        &pkg,
        r#"{
            "author": "Demo", "repo": "Gone",
            "binname": "bar",
            "uninstallScript": "rm.sh",
            "arches": ["all"], "distros": ["all"],
            "toCopy": []
        }"#,
        &[("bar", "#!/bin/sh\necho bar\n"), ("rm.sh", "exit 1\n")],
    );

    ops::install::install_package(&mut ctx, pkg.to_str().unwrap()).unwrap();
    assert!(ctx.paths.binaries.join("bar").symlink_metadata().is_ok());
    assert!(InstallationRecord::exists(&ctx.paths, "demo/gone"));

    // The script exits 1; cleanup must proceed anyway.
    ops::uninstall::uninstall_package(&mut ctx, "demo/gone").unwrap();

    assert!(!ctx.paths.publish_dir("demo/gone").exists());
    assert!(!ctx.paths.checkout_dir("demo/gone").exists());
    assert!(ctx.paths.binaries.join("bar").symlink_metadata().is_err());
}

#[test]
fn existing_checkout_without_fresh_routes_to_update() {
    let tmp = TempDir::new().unwrap();
    let mut ctx = test_context(tmp.path());

    let name = "avalon-test-nobody/no-such-repo";
    let checkout = ctx.paths.checkout_dir(name);
    std::fs::create_dir_all(&checkout).unwrap();
    std::fs::write(checkout.join("marker"), "x").unwrap();

    // The checkout is not a git repository, so the update flow's pull (and
    // its reset fallback) fail; the fresh flow would have deleted the
    // checkout before ever touching git.
    let err = ops::install::install_package(&mut ctx, name).unwrap_err();
    assert!(matches!(err, InstallError::Subprocess { .. }), "got {err:?}");
    assert!(checkout.join("marker").exists());
}

#[test]
fn fresh_flag_deletes_prior_checkout_before_cloning() {
    let tmp = TempDir::new().unwrap();
    let mut ctx = test_context(tmp.path());
    ctx.flags.fresh = true;

    let name = "avalon-test-nobody/no-such-repo";
    let checkout = ctx.paths.checkout_dir(name);
    std::fs::create_dir_all(&checkout).unwrap();
    std::fs::write(checkout.join("marker"), "x").unwrap();

    // The clone of a nonexistent repository fails, but only after the old
    // state was deleted.
    let err = ops::install::install_package(&mut ctx, name).unwrap_err();
    assert!(matches!(err, InstallError::Subprocess { .. }), "got {err:?}");
    assert!(!checkout.join("marker").exists());
}

#[test]
fn recorded_avalon_dependency_is_not_reinstalled() {
    let tmp = TempDir::new().unwrap();
    let mut ctx = test_context(tmp.path());

    InstallationRecord::new("demo/dep", None, None).write(&ctx.paths).unwrap();

    // An install attempt would try to clone and fail; the record must make
    // this a no-op instead.
    ops::deps::install_avalon(&mut ctx, &["demo/dep".to_string()]).unwrap();
}

#[test]
fn dependency_cycle_fails_fast() {
    let tmp = TempDir::new().unwrap();
    let mut ctx = test_context(tmp.path());

    ctx.in_progress.insert("demo/dep".to_string());

    let err = ops::deps::install_avalon(&mut ctx, &["demo/dep".to_string()]).unwrap_err();
    match err {
        InstallError::DependencyCycle(name) => assert_eq!(name, "demo/dep"),
        other => panic!("expected DependencyCycle, got {other:?}"),
    }
}

#[test]
fn unmet_platform_constraint_aborts_and_cleans_up() {
    let tmp = TempDir::new().unwrap();
    let mut ctx = test_context(&tmp.path().join("home"));

    let pkg = tmp.path().join("pkg");
    write_package(
        &pkg,
        r#"{
            "author": "Demo", "repo": "Exotic",
            "arches": ["pdp11"],
            "distros": ["all"],
            "toCopy": []
        }"#,
        &[],
    );

    let err = ops::install::install_package(&mut ctx, pkg.to_str().unwrap()).unwrap_err();
    assert!(matches!(err, InstallError::UnsupportedPlatform { .. }), "got {err:?}");
    assert!(!ctx.paths.checkout_dir("demo/exotic").exists());
    assert!(!ctx.paths.publish_dir("demo/exotic").exists());

    // Forced mode downgrades the failure to a warning and completes.
    ctx.flags.force = true;
    ops::install::install_package(&mut ctx, pkg.to_str().unwrap()).unwrap();
    assert!(InstallationRecord::exists(&ctx.paths, "demo/exotic"));
}

#[test]
fn noinstall_skips_compilation_and_record() {
    let tmp = TempDir::new().unwrap();
    let mut ctx = test_context(&tmp.path().join("home"));
    ctx.flags.noinstall = true;

    let pkg = tmp.path().join("pkg");
    write_package(
        &pkg,
        r#"{
            "author": "Demo", "repo": "Skipped",
            "needsCompiled": true,
            "binname": "baz",
            "compileScript": "build.sh",
            "arches": ["all"], "distros": ["all"]
        }"#,
        &[("build.sh", "exit 1\n")],
    );

    // The failing compile script is never run under --noinstall.
    ops::install::install_package(&mut ctx, pkg.to_str().unwrap()).unwrap();

    assert!(ctx.paths.checkout_dir("demo/skipped").exists());
    assert!(!InstallationRecord::exists(&ctx.paths, "demo/skipped"));
}

#[test]
fn redobin_recreates_a_removed_symlink() {
    let tmp = TempDir::new().unwrap();
    let mut ctx = test_context(&tmp.path().join("home"));

    let pkg = tmp.path().join("pkg");
    write_package(
        &pkg,
        r#"{
            "author": "Demo", "repo": "Linked",
            "binname": "qux",
            "arches": ["all"], "distros": ["all"],
            "toCopy": []
        }"#,
        &[("qux", "#!/bin/sh\n")],
    );

    ops::install::install_package(&mut ctx, pkg.to_str().unwrap()).unwrap();

    let link = ctx.paths.binaries.join("qux");
    std::fs::remove_file(&link).unwrap();
    assert!(link.symlink_metadata().is_err());

    ops::redobin::redo_symlinks(&mut ctx, "demo/linked").unwrap();
    assert!(link.symlink_metadata().unwrap().is_symlink());
    assert_eq!(
        std::fs::read_link(&link).unwrap(),
        ctx.paths.publish_dir("demo/linked").join("qux")
    );
}
