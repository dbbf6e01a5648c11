//! Package metadata parsing.
//!
//! The `.avalon/package` file a package ships (or the registry mirrors on its
//! behalf) is a flat JSON object. Every field is optional: absence means
//! "not applicable", never an error by itself.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or parsing a metadata file.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// An I/O error occurred while reading a metadata file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The JSON content could not be deserialized into valid metadata.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Dependency lists grouped by the manager that installs them.
///
/// The JSON keys are fixed: `apt`, `build-dep`, `avalon`, `pip`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyMap {
    /// System packages installed through the OS package manager.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub apt: Vec<String>,
    /// Build prerequisites installed via `apt build-dep`.
    #[serde(default, rename = "build-dep", skip_serializing_if = "Vec::is_empty")]
    pub build_dep: Vec<String>,
    /// Same-manager dependencies, installed recursively through Avalon.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub avalon: Vec<String>,
    /// Python packages installed through pip.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pip: Vec<String>,
}

impl DependencyMap {
    /// Whether no dependency of any kind is declared.
    pub fn is_empty(&self) -> bool {
        self.apt.is_empty() && self.build_dep.is_empty() && self.avalon.is_empty() && self.pip.is_empty()
    }
}

/// A package's declared metadata.
///
/// Field names follow the wire format (`camelCase` where the format uses
/// it). Unknown fields are ignored so older clients keep working when
/// packages add fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageMetadata {
    /// Semantic version string of the package, if it declares one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Repository owner; only required by archive/directory installs, where
    /// the true package name must be learned from the metadata itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Repository name; see `author`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,

    /// Name of the published binary (the `$PATH` entry).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binname: Option<String>,
    /// On-disk name of the build output, when it differs from `binname`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binfile: Option<String>,

    /// Declared dependencies, grouped by kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deps: Option<DependencyMap>,

    /// Supported CPU architectures, or the sentinel `["all"]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arches: Option<Vec<String>>,
    /// Supported distributions, or the sentinel `["all"]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distros: Option<Vec<String>>,

    /// Path of the compile script, relative to the checkout.
    #[serde(default, rename = "compileScript", skip_serializing_if = "Option::is_none")]
    pub compile_script: Option<String>,
    /// Path of the install script, relative to the checkout.
    #[serde(default, rename = "installScript", skip_serializing_if = "Option::is_none")]
    pub install_script: Option<String>,
    /// Path of the uninstall script, relative to the checkout.
    #[serde(default, rename = "uninstallScript", skip_serializing_if = "Option::is_none")]
    pub uninstall_script: Option<String>,

    /// Extra files or directories to publish alongside the binary.
    #[serde(default, rename = "toCopy", skip_serializing_if = "Option::is_none")]
    pub to_copy: Option<Vec<String>>,

    /// Whether the package must be compiled before publication.
    #[serde(default, rename = "needsCompiled", skip_serializing_if = "Option::is_none")]
    pub needs_compiled: Option<bool>,
    /// Defer symlink creation until after the install script has run.
    #[serde(default, rename = "mvBinAfterInstallScript", skip_serializing_if = "Option::is_none")]
    pub mv_bin_after_install_script: Option<bool>,
}

impl PackageMetadata {
    /// Parse a metadata file from disk.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::Io` if the file cannot be read, or
    /// `MetadataError::Parse` if the JSON content is invalid.
    pub fn from_file(path: &Path) -> Result<Self, MetadataError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a metadata document from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::Parse` if the JSON content is invalid.
    pub fn parse(content: &str) -> Result<Self, MetadataError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Declared dependencies, or an empty map when none are declared.
    pub fn deps(&self) -> DependencyMap {
        self.deps.clone().unwrap_or_default()
    }

    /// Whether the package must be compiled before publication.
    pub fn needs_compiled(&self) -> bool {
        self.needs_compiled.unwrap_or(false)
    }

    /// Whether symlink publication is deferred until after the install script.
    pub fn mv_bin_after_install_script(&self) -> bool {
        self.mv_bin_after_install_script.unwrap_or(false)
    }

    /// The on-disk build output name: `binfile` when set, else `binname`.
    pub fn effective_binfile(&self) -> Option<&str> {
        self.binfile.as_deref().or(self.binname.as_deref())
    }

    /// Whether the package carries a binary context: compiled output or a
    /// named binary. Decides which install-script argument contract applies.
    pub fn has_binary_context(&self) -> bool {
        self.needs_compiled() || self.compile_script.is_some() || self.binname.is_some()
    }
}

impl std::str::FromStr for PackageMetadata {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE_PACKAGE: &str = r#"
{
    "version": "1.4.2",
    "binname": "qdl",
    "binfile": "target/release/qdl",
    "deps": {
        "apt": ["libssl-dev", "pkg-config"],
        "build-dep": ["curl"],
        "avalon": ["r2boyo25/avalongen"],
        "pip": ["requests"]
    },
    "arches": ["x86_64", "aarch64"],
    "distros": ["all"],
    "compileScript": "build.sh",
    "installScript": "install.sh",
    "toCopy": ["assets", "README.md"],
    "needsCompiled": true
}
"#;

    #[test]
    fn test_parse_full_metadata() {
        let meta = PackageMetadata::parse(EXAMPLE_PACKAGE).unwrap();

        assert_eq!(meta.version.as_deref(), Some("1.4.2"));
        assert_eq!(meta.binname.as_deref(), Some("qdl"));
        assert_eq!(meta.effective_binfile(), Some("target/release/qdl"));
        assert!(meta.needs_compiled());
        assert!(!meta.mv_bin_after_install_script());

        let deps = meta.deps();
        assert_eq!(deps.apt, vec!["libssl-dev", "pkg-config"]);
        assert_eq!(deps.build_dep, vec!["curl"]);
        assert_eq!(deps.avalon, vec!["r2boyo25/avalongen"]);
        assert_eq!(deps.pip, vec!["requests"]);
    }

    #[test]
    fn test_empty_object_is_valid() {
        // Absence of every field means "not applicable", never an error.
        let meta = PackageMetadata::parse("{}").unwrap();
        assert!(meta.version.is_none());
        assert!(meta.binname.is_none());
        assert!(meta.deps().is_empty());
        assert!(!meta.needs_compiled());
        assert!(!meta.has_binary_context());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let meta = PackageMetadata::parse(r#"{"binname": "x", "futureField": 3}"#).unwrap();
        assert_eq!(meta.binname.as_deref(), Some("x"));
    }

    #[test]
    fn test_parse_malformed_json() {
        assert!(PackageMetadata::parse("not json {{{").is_err());
        // A JSON array is not a metadata object either.
        assert!(PackageMetadata::parse("[1, 2]").is_err());
    }

    #[test]
    fn test_build_dep_key_rename() {
        let meta = PackageMetadata::parse(r#"{"deps": {"build-dep": ["make"]}}"#).unwrap();
        assert_eq!(meta.deps().build_dep, vec!["make"]);
    }

    #[test]
    fn test_effective_binfile_falls_back_to_binname() {
        let meta = PackageMetadata::parse(r#"{"binname": "tool"}"#).unwrap();
        assert_eq!(meta.effective_binfile(), Some("tool"));
        assert!(meta.has_binary_context());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("package");
        std::fs::write(&path, r#"{"version": "0.1.0"}"#).unwrap();

        let meta = PackageMetadata::from_file(&path).unwrap();
        assert_eq!(meta.version.as_deref(), Some("0.1.0"));
    }
}
