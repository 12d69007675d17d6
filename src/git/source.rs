//! Repository discovery
//!
//! A [`RepoSource`] enumerates the repositories in the backing store and
//! opens them by identity.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use git2::Repository;

use super::repo::{GitRepo, Repo};
use crate::error::{Error, Result};

pub trait RepoSource: Send + Sync {
    /// Identities of every repository in the store, in discovery order
    fn list_all(&self) -> Result<Vec<String>>;

    /// Open a repository by identity
    fn open(&self, name: &str) -> Result<Arc<dyn Repo>>;
}

/// Repositories stored as directories under a root path.
///
/// Both `name` (non-bare) and `name.git` (bare) layouts are accepted; the
/// identity of `name.git` is `name`.
#[derive(Debug, Clone)]
pub struct GitRepoSource {
    root: PathBuf,
}

impl GitRepoSource {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn locate(&self, name: &str) -> Option<PathBuf> {
        // Identities are single path components
        if name.is_empty() || name.contains('/') || name.contains('\\') || name.starts_with('.') {
            return None;
        }
        [self.root.join(name), self.root.join(format!("{name}.git"))]
            .into_iter()
            .find(|p| Repository::open(p).is_ok())
    }
}

impl RepoSource for GitRepoSource {
    fn list_all(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            tracing::warn!(root = %self.root.display(), "repository root does not exist");
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().to_string();
            if file_name.starts_with('.') {
                continue;
            }
            if Repository::open(entry.path()).is_err() {
                tracing::debug!(path = %entry.path().display(), "skipping non-repository directory");
                continue;
            }
            let name = file_name.strip_suffix(".git").unwrap_or(&file_name).to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }

        // read_dir order is platform dependent
        names.sort();
        Ok(names)
    }

    fn open(&self, name: &str) -> Result<Arc<dyn Repo>> {
        let path = self
            .locate(name)
            .ok_or_else(|| Error::NotFound(format!("repository {name}")))?;
        Ok(Arc::new(GitRepo::new(name, &path)))
    }
}
