//! Metadata resolution with multi-source fallback.
//!
//! Resolution walks an explicit ordered list of sources and stops at the
//! first that yields parseable metadata: the checkout's own
//! `.avalon/package`, the local registry mirror, then remote candidates
//! over HTTP. A 404 at any remote candidate just advances to the next one;
//! a malformed body is logged and treated the same as absence. Only when
//! every source fails is the lookup an error.

use std::path::{Path, PathBuf};

use avalon_schema::PackageMetadata;

use crate::case::case_insensitive_path;
use crate::error::InstallError;
use crate::fsutil;
use crate::git;
use crate::ident::PackageIdentifier;
use crate::paths::Paths;

/// `owner/repo` of the central metadata registry.
pub const REGISTRY_SLUG: &str = "R2Boyo25/AvalonPMPackages";

/// Clone URL of the central metadata registry.
pub const REGISTRY_CLONE_URL: &str = "https://github.com/R2Boyo25/AvalonPMPackages";

/// Raw-content host serving both registry entries and package checkouts.
pub const DEFAULT_RAW_HOST: &str = "https://raw.githubusercontent.com";

/// Resolves package metadata from local and remote sources.
///
/// The raw-content host is injectable so tests can stand in a local HTTP
/// server for the remote sources.
#[derive(Debug, Clone)]
pub struct MetadataResolver {
    client: reqwest::blocking::Client,
    raw_host: String,
}

impl MetadataResolver {
    /// Create a resolver against the default raw-content host.
    pub fn new(client: reqwest::blocking::Client) -> Self {
        Self::with_raw_host(client, DEFAULT_RAW_HOST)
    }

    /// Create a resolver against an explicit raw-content host.
    pub fn with_raw_host(client: reqwest::blocking::Client, raw_host: impl Into<String>) -> Self {
        Self {
            client,
            raw_host: raw_host.into(),
        }
    }

    /// Resolve metadata for a package, local sources first.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::MetadataUnavailable`] naming the package when
    /// no source yields parseable metadata.
    pub fn resolve(
        &self,
        paths: &Paths,
        ident: &PackageIdentifier,
    ) -> Result<PackageMetadata, InstallError> {
        let name = ident.dir_name();
        tracing::debug!("resolving metadata for {name}");

        let local_sources: [fn(&Paths, &str) -> Option<PackageMetadata>; 2] =
            [checkout_metadata, mirror_metadata];
        for source in local_sources {
            if let Some(metadata) = source(paths, &name) {
                return Ok(metadata);
            }
        }

        for url in self.remote_candidates(ident) {
            if let Some(metadata) = self.fetch_candidate(&url) {
                return Ok(metadata);
            }
        }

        Err(InstallError::MetadataUnavailable(name))
    }

    /// The ordered remote candidate URLs for a package: the registry entry,
    /// the package's own `main` and `master` branches, then the explicit
    /// branch or commit when the identifier pins one.
    fn remote_candidates(&self, ident: &PackageIdentifier) -> Vec<String> {
        let raw = &self.raw_host;
        let remote = ident.remote_path();

        let mut candidates = vec![
            format!("{raw}/{REGISTRY_SLUG}/master/{}/package", ident.dir_name()),
            format!("{raw}/{remote}/main/.avalon/package"),
            format!("{raw}/{remote}/master/.avalon/package"),
        ];
        if let Some(reference) = ident.branch.as_deref().or_else(|| ident.commit.as_deref()) {
            candidates.push(format!("{raw}/{remote}/{reference}/.avalon/package"));
        }
        candidates
    }

    fn fetch_candidate(&self, url: &str) -> Option<PackageMetadata> {
        tracing::debug!("trying URL: {url}");

        let response = match self.client.get(url).send() {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("metadata fetch from {url} failed: {e}");
                return None;
            }
        };

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!("{url}: not found");
            return None;
        }

        let body = match response.text() {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("failed to read metadata body from {url}: {e}");
                return None;
            }
        };

        match PackageMetadata::parse(&body) {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                tracing::warn!("failed to parse package metadata at {url}: {e}");
                None
            }
        }
    }
}

/// Path of a checkout's own metadata file.
pub fn checkout_metadata_path(paths: &Paths, name: &str) -> PathBuf {
    paths.checkout_dir(name).join(".avalon").join("package")
}

/// Metadata declared by the checkout itself, when present and parseable.
pub fn checkout_metadata(paths: &Paths, name: &str) -> Option<PackageMetadata> {
    read_metadata_file(&checkout_metadata_path(paths, name))
}

/// Metadata from the registry mirror, when present and parseable. The
/// mirror directory casing may not match the lower-cased package name, so
/// the path is resolved case-insensitively.
pub fn mirror_metadata(paths: &Paths, name: &str) -> Option<PackageMetadata> {
    let path = case_insensitive_path(&paths.metadata_cache.join(name).join("package"));
    read_metadata_file(&path)
}

fn read_metadata_file(path: &Path) -> Option<PackageMetadata> {
    if !path.exists() {
        return None;
    }
    match PackageMetadata::from_file(path) {
        Ok(metadata) => Some(metadata),
        Err(e) => {
            tracing::warn!("failed to parse package metadata at {}: {e}", path.display());
            None
        }
    }
}

/// Whether the checkout carries its own `.avalon/package`.
pub fn is_self_describing(paths: &Paths, name: &str) -> bool {
    checkout_metadata_path(paths, name).exists()
}

/// Whether the registry mirror has a parseable entry for the package.
pub fn is_in_registry(paths: &Paths, name: &str) -> bool {
    mirror_metadata(paths, name).is_some()
}

/// Clone the registry into the mirror directory, or pull when it is
/// already cloned.
///
/// # Errors
///
/// Returns [`InstallError::Subprocess`] when git fails.
pub fn sync_mirror(paths: &Paths) -> Result<(), InstallError> {
    if paths.metadata_cache.join(".git").exists() {
        git::pull(&paths.metadata_cache)
    } else {
        std::fs::create_dir_all(&paths.metadata_cache)?;
        git::clone_shallow(REGISTRY_CLONE_URL, &paths.metadata_cache)
    }
}

/// Sync the mirror only when it has never been cloned. A sync failure is
/// not fatal to resolution — later sources may still succeed — so it is
/// logged and swallowed here.
pub fn ensure_mirror(paths: &Paths) {
    if paths.metadata_cache.join(".git").exists() {
        return;
    }
    if let Err(e) = sync_mirror(paths) {
        tracing::warn!("failed to sync the metadata registry mirror: {e}");
    }
}

/// Copy the package's registry entry into the checkout's `.avalon`
/// directory, replacing any stale copy. No-op when the registry has no
/// entry for the package.
///
/// # Errors
///
/// Returns an error when the copy itself fails.
pub fn copy_registry_metadata(paths: &Paths, name: &str) -> Result<(), InstallError> {
    let dest = paths.checkout_dir(name).join(".avalon");
    fsutil::remove_dir_all_quiet(&dest);

    if !is_in_registry(paths, name) {
        tracing::debug!("{name} is not in the registry mirror");
        return Ok(());
    }

    let entry = case_insensitive_path(&paths.metadata_cache.join(name));
    tracing::debug!("copying registry metadata from {} to {}", entry.display(), dest.display());
    fsutil::copy_tree(&entry, &dest)?;
    Ok(())
}
