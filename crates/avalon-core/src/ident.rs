//! Package identifier parsing.
//!
//! A package is named by its hosted repository, optionally pinned to a
//! branch or a commit: `owner/repo`, `owner/repo:commitsha`,
//! `owner/repo/branchname`. A colon marks a trailing commit; without a
//! colon, anything past the second path component is a branch name. A
//! string carrying both markers is ambiguous and rejected outright.

use thiserror::Error;

/// Errors produced while parsing a package identifier.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum IdentError {
    /// The string is not in `owner/repo` form.
    #[error("invalid package identifier '{0}': expected 'owner/repo'")]
    Malformed(String),

    /// Both a commit marker and a branch marker are present.
    #[error("ambiguous package identifier '{0}': a branch and a commit cannot both be specified")]
    Ambiguous(String),
}

/// A parsed package identifier. Created once per invocation; immutable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageIdentifier {
    /// Repository owner, original casing preserved.
    pub owner: String,
    /// Repository name, original casing preserved.
    pub repo: String,
    /// Pinned branch, when the identifier carries one.
    pub branch: Option<String>,
    /// Pinned commit, when the identifier carries one.
    pub commit: Option<String>,
}

impl PackageIdentifier {
    /// Parse an identifier string.
    ///
    /// # Errors
    ///
    /// Returns [`IdentError::Ambiguous`] when both a commit (`:`) and a
    /// branch (extra `/`) are present, and [`IdentError::Malformed`] for
    /// anything that does not reduce to a non-empty `owner/repo` pair.
    pub fn parse(input: &str) -> Result<Self, IdentError> {
        let (head, commit) = match input.split_once(':') {
            Some((head, commit)) => {
                if commit.is_empty() || commit.contains(':') {
                    return Err(IdentError::Malformed(input.to_string()));
                }
                (head, Some(commit.to_string()))
            }
            None => (input, None),
        };

        let parts: Vec<&str> = head.split('/').collect();
        if parts.len() < 2 || parts.iter().any(|p| p.is_empty()) {
            return Err(IdentError::Malformed(input.to_string()));
        }

        let branch = (parts.len() > 2).then(|| parts[2..].join("/"));
        if branch.is_some() && commit.is_some() {
            return Err(IdentError::Ambiguous(input.to_string()));
        }

        Ok(Self {
            owner: parts[0].to_string(),
            repo: parts[1].to_string(),
            branch,
            commit,
        })
    }

    /// Lower-cased `owner/repo`, used for every on-disk directory.
    pub fn dir_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo).to_lowercase()
    }

    /// `owner/repo` with original casing, used for remote fetch URLs.
    pub fn remote_path(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// The repository clone URL.
    pub fn clone_url(&self) -> String {
        format!("https://github.com/{}", self.remote_path())
    }
}

impl std::str::FromStr for PackageIdentifier {
    type Err = IdentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for PackageIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.remote_path())?;
        if let Some(branch) = &self.branch {
            write!(f, "/{branch}")?;
        }
        if let Some(commit) = &self.commit {
            write!(f, ":{commit}")?;
        }
        Ok(())
    }
}
