//! Repository capability
//!
//! The pages of the browser only ever talk to a repository through the
//! [`Repo`] trait. [`GitRepo`] is the git2-backed implementation; it reopens
//! the store on every call so a repository that disappears underneath a
//! session surfaces as `NotFound` instead of stale data.

use std::path::{Path, PathBuf};

use git2::Repository;

use super::commits::{self, Commit};
use super::diff::{self, CommitDiff};
use super::tree::{self, TreeEntry};
use crate::config::Limits;
use crate::error::{Error, Result};

/// What the browser needs from a repository
pub trait Repo: Send + Sync {
    /// Repository identity
    fn name(&self) -> &str;

    /// All commits, newest first by author time
    fn commits(&self) -> Result<Vec<Commit>>;

    /// Sorted listing of the directory at `path` ("" is the root)
    fn tree(&self, path: &str) -> Result<Vec<TreeEntry>>;

    /// Contents of the file at `path`
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;

    /// Readme text, empty if there is none
    fn readme(&self) -> String;

    /// Diff of a commit against its first parent, hunks bounded by `limits`
    fn diff(&self, commit: &Commit, limits: &Limits) -> Result<CommitDiff>;
}

const README_NAMES: &[&str] = &["README.md", "readme.md", "README", "README.txt"];

/// A repository on disk
#[derive(Debug, Clone)]
pub struct GitRepo {
    name: String,
    path: PathBuf,
}

impl GitRepo {
    pub fn new(name: &str, path: &Path) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_path_buf(),
        }
    }

    fn open(&self) -> Result<Repository> {
        Repository::open(&self.path).map_err(|err| {
            tracing::debug!(repo = %self.name, error = %err, "failed to open repository");
            Error::NotFound(format!("repository {}", self.name))
        })
    }
}

impl Repo for GitRepo {
    fn name(&self) -> &str {
        &self.name
    }

    fn commits(&self) -> Result<Vec<Commit>> {
        commits::list_commits(&self.open()?)
    }

    fn tree(&self, path: &str) -> Result<Vec<TreeEntry>> {
        tree::list_directory(&self.open()?, path)
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        tree::read_file(&self.open()?, path)
    }

    fn readme(&self) -> String {
        let Ok(repo) = self.open() else {
            return String::new();
        };
        README_NAMES
            .iter()
            .find_map(|name| tree::read_file(&repo, name).ok())
            .map(|bytes| String::from_utf8_lossy(&bytes).to_string())
            .unwrap_or_default()
    }

    fn diff(&self, commit: &Commit, limits: &Limits) -> Result<CommitDiff> {
        diff::compute_commit_diff(&self.open()?, &commit.hash, limits)
    }
}
