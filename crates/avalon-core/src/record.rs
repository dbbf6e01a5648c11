//! Installation records.
//!
//! A package is installed iff its record exists and parses. The record
//! lives inside the publish directory, so deleting `files/<package>` —
//! the uninstall action — atomically removes the installed state with it,
//! and a crash before publication completes leaves the package observably
//! not-installed.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::InstallError;
use crate::paths::Paths;

/// File name of the record inside a package's publish directory.
pub const RECORD_FILE: &str = ".install-record";

/// Persisted proof that a package completed installation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallationRecord {
    /// Lower-cased `owner/repo` name of the package.
    pub package: String,
    /// The version the metadata declared at install time, if any.
    pub version: Option<String>,
    /// Absolute path of the published binary, if the package has one.
    pub binary: Option<PathBuf>,
    /// When the installation completed.
    pub installed_at: DateTime<Utc>,
}

impl InstallationRecord {
    /// Create a record stamped with the current time.
    pub fn new(package: &str, version: Option<String>, binary: Option<PathBuf>) -> Self {
        Self {
            package: package.to_string(),
            version,
            binary,
            installed_at: Utc::now(),
        }
    }

    /// Persist the record into the package's publish directory.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be created or the record
    /// cannot be serialized or written.
    pub fn write(&self, paths: &Paths) -> Result<(), InstallError> {
        let dir = paths.publish_dir(&self.package);
        std::fs::create_dir_all(&dir)?;
        let body = serde_json::to_string_pretty(self)
            .map_err(|e| InstallError::Validation(format!("failed to serialize record: {e}")))?;
        std::fs::write(dir.join(RECORD_FILE), body)?;
        Ok(())
    }

    /// Load a package's record, or `None` when the package is not
    /// installed. An unparseable record is logged and treated as absent.
    pub fn load(paths: &Paths, package: &str) -> Option<Self> {
        let path = paths.publish_dir(package).join(RECORD_FILE);
        let content = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("unreadable installation record at {}: {e}", path.display());
                None
            }
        }
    }

    /// Whether the package is installed.
    pub fn exists(paths: &Paths, package: &str) -> bool {
        Self::load(paths, package).is_some()
    }
}

/// Every installed package as `owner/repo==version` (or bare `owner/repo`
/// when the metadata declared no version), sorted by name.
pub fn list_installed(paths: &Paths) -> Vec<String> {
    let mut entries = Vec::new();

    let Ok(owners) = std::fs::read_dir(&paths.files) else {
        return entries;
    };
    for owner in owners.filter_map(Result::ok) {
        let Ok(repos) = std::fs::read_dir(owner.path()) else {
            continue;
        };
        for repo in repos.filter_map(Result::ok) {
            let name = format!(
                "{}/{}",
                owner.file_name().to_string_lossy(),
                repo.file_name().to_string_lossy()
            );
            match InstallationRecord::load(paths, &name) {
                Some(record) => match record.version {
                    Some(version) => entries.push(format!("{name}=={version}")),
                    None => entries.push(name),
                },
                None => continue,
            }
        }
    }

    entries.sort();
    entries
}
