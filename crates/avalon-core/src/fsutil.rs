//! Filesystem helpers shared by the install pipeline.

use std::io;
use std::path::Path;

/// The final path component of a binary name (`target/release/tool` →
/// `tool`). Binary names in metadata may carry a relative path; only the
/// last component names the published file and symlink.
pub fn file_name_of(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Copy a single file, skipping the copy when the destination already has
/// identical content. Parent directories are created as needed.
///
/// # Errors
///
/// Returns any `io::Error` from reading, creating directories, or copying.
pub fn copy_file_if_changed(src: &Path, dst: &Path) -> io::Result<()> {
    if let Some(parent) = dst.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if dst.exists() && files_identical(src, dst)? {
        return Ok(());
    }

    std::fs::copy(src, dst)?;
    Ok(())
}

fn files_identical(a: &Path, b: &Path) -> io::Result<bool> {
    if std::fs::metadata(a)?.len() != std::fs::metadata(b)?.len() {
        return Ok(false);
    }
    Ok(std::fs::read(a)? == std::fs::read(b)?)
}

/// Copy a file or directory tree from `src` to `dst`, file-by-file with
/// identical-content skipping. Missing sources are ignored.
///
/// # Errors
///
/// Returns any `io::Error` raised while walking or copying.
pub fn copy_path(src: &Path, dst: &Path) -> io::Result<()> {
    if src.is_file() {
        return copy_file_if_changed(src, dst);
    }
    if !src.exists() {
        return Ok(());
    }

    for entry in walkdir::WalkDir::new(src)
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        copy_file_if_changed(entry.path(), &dst.join(relative))?;
    }
    Ok(())
}

/// Recursively copy the contents of `src` into `dst`, overwriting.
///
/// # Errors
///
/// Returns an error when any file or directory cannot be copied.
pub fn copy_tree(src: &Path, dst: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dst)?;
    fs_extra::dir::copy(
        src,
        dst,
        &fs_extra::dir::CopyOptions::new().content_only(true).overwrite(true),
    )
    .map_err(|e| io::Error::other(format!("copy failed: {e}")))?;
    Ok(())
}

/// Remove a directory tree, ignoring a missing path.
pub fn remove_dir_all_quiet(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_dir_all(path) {
            tracing::debug!("failed to remove {}: {e}", path.display());
        }
    }
}

/// Remove a file or symlink, ignoring a missing path. Checks the link
/// itself, not its target, so dangling symlinks are removed too.
pub fn remove_file_quiet(path: &Path) {
    if path.symlink_metadata().is_ok() {
        if let Err(e) = std::fs::remove_file(path) {
            tracing::debug!("failed to remove {}: {e}", path.display());
        }
    }
}

/// Mark a file executable (0o755). Missing files are ignored: a compile
/// script may have installed the binary itself.
pub fn make_executable(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if path.exists() {
            let _ = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755));
        }
    }
}

/// Replace `link` with a symlink pointing at `target`. Any existing file or
/// symlink at `link` is removed first.
///
/// # Errors
///
/// Returns any `io::Error` from removing the old entry or creating the link.
pub fn replace_symlink(target: &Path, link: &Path) -> io::Result<()> {
    if link.symlink_metadata().is_ok() {
        std::fs::remove_file(link)?;
    }
    #[cfg(unix)]
    std::os::unix::fs::symlink(target, link)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_name_of() {
        assert_eq!(file_name_of("tool"), "tool");
        assert_eq!(file_name_of("target/release/tool"), "tool");
    }

    #[test]
    fn test_copy_file_if_changed_skips_identical() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("a");
        let dst = tmp.path().join("b");
        std::fs::write(&src, "same").unwrap();
        std::fs::write(&dst, "same").unwrap();

        let before = std::fs::metadata(&dst).unwrap().modified().unwrap();
        copy_file_if_changed(&src, &dst).unwrap();
        let after = std::fs::metadata(&dst).unwrap().modified().unwrap();
        assert_eq!(before, after);

        std::fs::write(&src, "changed").unwrap();
        copy_file_if_changed(&src, &dst).unwrap();
        assert_eq!(std::fs::read_to_string(&dst).unwrap(), "changed");
    }

    #[test]
    fn test_copy_path_recurses_directories() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("src");
        std::fs::create_dir_all(src.join("nested")).unwrap();
        std::fs::write(src.join("nested/file"), "x").unwrap();

        let dst = tmp.path().join("dst");
        copy_path(&src, &dst).unwrap();
        assert_eq!(std::fs::read_to_string(dst.join("nested/file")).unwrap(), "x");
    }

    #[test]
    fn test_copy_path_ignores_missing_source() {
        let tmp = tempdir().unwrap();
        copy_path(&tmp.path().join("absent"), &tmp.path().join("dst")).unwrap();
    }

    #[test]
    fn test_replace_symlink_overwrites() {
        let tmp = tempdir().unwrap();
        let target_a = tmp.path().join("a");
        let target_b = tmp.path().join("b");
        std::fs::write(&target_a, "a").unwrap();
        std::fs::write(&target_b, "b").unwrap();

        let link = tmp.path().join("link");
        replace_symlink(&target_a, &link).unwrap();
        replace_symlink(&target_b, &link).unwrap();
        assert_eq!(std::fs::read_link(&link).unwrap(), target_b);
    }

    #[test]
    fn test_remove_file_quiet_handles_dangling_symlink() {
        let tmp = tempdir().unwrap();
        let link = tmp.path().join("link");
        replace_symlink(&tmp.path().join("gone"), &link).unwrap();

        assert!(link.symlink_metadata().is_ok());
        remove_file_quiet(&link);
        assert!(link.symlink_metadata().is_err());
    }
}
