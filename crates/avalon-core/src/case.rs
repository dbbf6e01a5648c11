//! Case-insensitive path resolution.
//!
//! The metadata registry names directories with the package's declared
//! casing, while lookups use the lower-cased on-disk name. On a
//! case-sensitive filesystem the two need not match, so mirror lookups
//! resolve each missing component by scanning its parent for a
//! case-insensitive match.

use std::path::{Path, PathBuf};

/// Resolve `path` against the filesystem, matching each nonexistent
/// component case-insensitively against its parent directory's entries.
///
/// Components that exist verbatim are kept as-is; a component with no
/// case-insensitive match is kept verbatim too, so the returned path simply
/// fails later existence checks the same way the input would have.
pub fn case_insensitive_path(path: &Path) -> PathBuf {
    if path.as_os_str().is_empty() || path.exists() {
        return path.to_path_buf();
    }

    let mut resolved = PathBuf::new();
    for component in path.components() {
        let candidate = resolved.join(component);
        if candidate.exists() || resolved.as_os_str().is_empty() {
            resolved = candidate;
            continue;
        }

        let Some(name) = candidate.file_name().map(std::ffi::OsStr::to_owned) else {
            resolved = candidate;
            continue;
        };
        let wanted = name.to_string_lossy().to_lowercase();

        let matched = std::fs::read_dir(&resolved).ok().and_then(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|e| e.file_name())
                .find(|entry| entry.to_string_lossy().to_lowercase() == wanted)
        });

        resolved = match matched {
            Some(actual) => resolved.join(actual),
            None => candidate,
        };
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_existing_path_returned_verbatim() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("File.TXT");
        std::fs::write(&file, "x").unwrap();

        assert_eq!(case_insensitive_path(&file), file);
    }

    #[test]
    fn test_resolves_mismatched_case() {
        let tmp = tempdir().unwrap();
        let actual = tmp.path().join("SomeDir").join("SomeFile.txt");
        std::fs::create_dir_all(actual.parent().unwrap()).unwrap();
        std::fs::write(&actual, "x").unwrap();

        let queried = tmp.path().join("somedir").join("sOmEfIlE.txt");
        assert_eq!(case_insensitive_path(&queried), actual);
    }

    #[test]
    fn test_resolves_nested_directories() {
        let tmp = tempdir().unwrap();
        let actual = tmp.path().join("Owner").join("Repo").join("package");
        std::fs::create_dir_all(actual.parent().unwrap()).unwrap();
        std::fs::write(&actual, "{}").unwrap();

        let queried = tmp.path().join("owner").join("repo").join("package");
        let resolved = case_insensitive_path(&queried);
        assert_eq!(resolved, actual);
        assert!(resolved.exists());
    }

    #[test]
    fn test_unmatched_component_kept_verbatim() {
        let tmp = tempdir().unwrap();
        let queried = tmp.path().join("missing").join("file");
        let resolved = case_insensitive_path(&queried);
        assert_eq!(resolved, queried);
        assert!(!resolved.exists());
    }
}
