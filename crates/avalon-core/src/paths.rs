//! The fixed set of named directories everything else consumes.

use std::io;
use std::path::{Path, PathBuf};

/// Process-wide directory layout, resolved once at startup.
///
/// `AVALON_HOME` overrides the whole layout (everything lands under one
/// root); `AVALON_BIN` overrides just the symlink directory. Without
/// overrides the layout follows the XDG base directories: checkouts and the
/// metadata mirror are cache data, published files and symlinks are
/// configuration-adjacent state.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Per-package source checkouts.
    pub source: PathBuf,
    /// User-facing symlinks, expected on `$PATH`.
    pub binaries: PathBuf,
    /// Local mirror of the central metadata registry.
    pub metadata_cache: PathBuf,
    /// Per-package published artifacts.
    pub files: PathBuf,
    /// Scratch space for archive-based installs.
    pub temp: PathBuf,
}

impl Paths {
    /// Resolve the layout from the environment, or `None` if the user's
    /// home directory cannot be determined and `AVALON_HOME` is unset.
    pub fn resolve() -> Option<Self> {
        if let Ok(root) = std::env::var("AVALON_HOME") {
            return Some(Self::at(Path::new(&root)));
        }

        let config = dirs::config_dir()?.join("avalon");
        let cache = dirs::cache_dir()?.join("avalon");

        let binaries = std::env::var("AVALON_BIN")
            .map_or_else(|_| config.join("bin"), PathBuf::from);

        Some(Self {
            source: cache.join("src"),
            binaries,
            metadata_cache: cache.join("cache"),
            files: config.join("files"),
            temp: std::env::temp_dir().join("avalon"),
        })
    }

    /// Lay out every directory under a single root. Used by `AVALON_HOME`
    /// and by tests.
    pub fn at(root: &Path) -> Self {
        Self {
            source: root.join("src"),
            binaries: root.join("bin"),
            metadata_cache: root.join("cache"),
            files: root.join("files"),
            temp: root.join("tmp"),
        }
    }

    /// Create every directory. Called once at process start; nothing in the
    /// core ever removes the directories themselves.
    ///
    /// # Errors
    ///
    /// Returns the first `io::Error` encountered while creating a directory.
    pub fn ensure(&self) -> io::Result<()> {
        for dir in [
            &self.source,
            &self.binaries,
            &self.metadata_cache,
            &self.files,
            &self.temp,
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// The checkout directory for a package (`source/<owner>/<repo>`).
    pub fn checkout_dir(&self, name: &str) -> PathBuf {
        self.source.join(name)
    }

    /// The publish directory for a package (`files/<owner>/<repo>`).
    pub fn publish_dir(&self, name: &str) -> PathBuf {
        self.files.join(name)
    }

    /// The symlink path for a published binary name. Only the final path
    /// component of `binname` is used.
    pub fn binary_link(&self, binname: &str) -> PathBuf {
        self.binaries.join(crate::fsutil::file_name_of(binname))
    }
}
